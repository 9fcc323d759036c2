use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::Book;

/// Client-side ordering of a result page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Source order.
    #[default]
    Relevance,
    TitleAsc,
    TitleDesc,
    YearNewest,
    YearOldest,
    MostEditions,
    PagesAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        Self::Relevance,
        Self::TitleAsc,
        Self::TitleDesc,
        Self::YearNewest,
        Self::YearOldest,
        Self::MostEditions,
        Self::PagesAsc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::TitleAsc => "title",
            Self::TitleDesc => "title-desc",
            Self::YearNewest => "newest",
            Self::YearOldest => "oldest",
            Self::MostEditions => "editions",
            Self::PagesAsc => "pages",
        }
    }

    /// Stable in-place sort. Books missing the sort field go last.
    pub fn sort(self, books: &mut [Book]) {
        match self {
            Self::Relevance => {}
            Self::TitleAsc => books.sort_by_cached_key(|b| b.title.to_lowercase()),
            Self::TitleDesc => {
                books.sort_by(|a, b| b.title.to_lowercase().cmp(&a.title.to_lowercase()))
            }
            Self::YearNewest => {
                books.sort_by(|a, b| missing_last(a.first_publish_year, b.first_publish_year, true))
            }
            Self::YearOldest => {
                books.sort_by(|a, b| missing_last(a.first_publish_year, b.first_publish_year, false))
            }
            Self::MostEditions => books.sort_by(|a, b| b.edition_count.cmp(&a.edition_count)),
            Self::PagesAsc => {
                books.sort_by(|a, b| missing_last(a.median_pages, b.median_pages, false))
            }
        }
    }

    pub fn sorted(self, books: &[Book]) -> Vec<Book> {
        let mut out = books.to_vec();
        self.sort(&mut out);
        out
    }
}

fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                CoreError::ValidationError(format!(
                    "unknown sort '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}
