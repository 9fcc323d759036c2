use serde::Serialize;

use crate::models::Book;

/// Query meaning "no filter".
pub const WILDCARD_QUERY: &str = "*";

/// True when `query` is the wildcard sentinel or blank.
pub fn is_wildcard(query: &str) -> bool {
    let q = query.trim();
    q.is_empty() || q == WILDCARD_QUERY
}

// ─── SearchPage ─────────────────────────────────────────────

/// One page of search results, in source (relevance) order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    books: Vec<Book>,
    total_results: u64,
    page: u32,
    limit: u32,
    start: u64,
}

impl SearchPage {
    /// Build a page. `page` is clamped to at least 1 and `books` truncated to `limit`.
    pub fn new(mut books: Vec<Book>, total_results: u64, page: u32, limit: u32, start: u64) -> Self {
        books.truncate(limit as usize);
        Self {
            books,
            total_results,
            page: page.max(1),
            limit,
            start,
        }
    }

    /// A page holding exactly `books`, unpaginated: `total_results` and `limit` equal its length.
    pub fn whole(books: Vec<Book>) -> Self {
        let len = books.len();
        Self::new(books, len as u64, 1, len as u32, 0)
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn into_books(self) -> Vec<Book> {
        self.books
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn start(&self) -> u64 {
        self.start
    }
}

// ─── Pagination ─────────────────────────────────────────────

/// Pagination cursor exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub total_results: u64,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, total_results: u64, limit: u32) -> Self {
        Self {
            page,
            total_results,
            limit,
        }
    }

    pub fn total_pages(&self) -> u64 {
        calculate_total_pages(self.total_results, self.limit)
    }

    /// Whether `page` is a navigable page, i.e. within `[1, total_pages]`.
    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && u64::from(page) <= self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// `ceil(total_results / limit)`, or 0 when `limit` is 0.
pub fn calculate_total_pages(total_results: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total_results.div_ceil(u64::from(limit))
}
