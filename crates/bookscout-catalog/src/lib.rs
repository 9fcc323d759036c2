//! bookscout catalog — Open Library search gateway, offline fallback, search session.

pub mod debounce;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod http;
pub mod session;

pub use debounce::Debouncer;
pub use error::{CatalogError, Result};
pub use fallback::{BookSource, FallbackGateway, FetchOutcome};
pub use gateway::{CatalogGateway, OpenLibraryGateway, WorkDetails};
pub use session::{Phase, SearchSession, SessionState};
