pub mod book;
pub mod page;

pub use book::*;
pub use page::*;
