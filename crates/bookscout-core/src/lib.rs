pub mod config;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod format;
pub mod history;
pub mod models;
pub mod sample;
pub mod sort;
pub mod stats;
pub mod storage;

pub use config::AppConfig;
pub use error::{CoreError, Result};
pub use models::*;

pub use favorites::Favorites;
pub use filter::{BookFilter, FilterOptions, PageRange};
pub use history::SearchHistory;
pub use sort::SortKey;
pub use stats::{DecadeBucket, LibraryStats};
pub use storage::{JsonFileStore, MemoryStore, PersistedStore};
