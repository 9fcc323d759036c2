//! Client-side filtering over an already-fetched result page.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::Book;

/// Median page-count bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageRange {
    #[default]
    All,
    UpTo200,
    From201To400,
    From401To600,
    Over600,
}

impl PageRange {
    /// Books with an unknown page count only pass `All`.
    pub fn contains(self, pages: Option<u32>) -> bool {
        match (self, pages) {
            (Self::All, _) => true,
            (_, None) => false,
            (Self::UpTo200, Some(p)) => p <= 200,
            (Self::From201To400, Some(p)) => (201..=400).contains(&p),
            (Self::From401To600, Some(p)) => (401..=600).contains(&p),
            (Self::Over600, Some(p)) => p > 600,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::UpTo200 => "0-200",
            Self::From201To400 => "201-400",
            Self::From401To600 => "401-600",
            Self::Over600 => "601+",
        }
    }
}

impl FromStr for PageRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::All),
            "0-200" => Ok(Self::UpTo200),
            "201-400" => Ok(Self::From201To400),
            "401-600" => Ok(Self::From401To600),
            "601+" => Ok(Self::Over600),
            other => Err(CoreError::ValidationError(format!(
                "unknown page range '{other}' (expected all, 0-200, 201-400, 401-600, 601+)"
            ))),
        }
    }
}

/// All active constraints; `None` fields are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFilter {
    /// First year of the decade, e.g. `1950`.
    pub decade: Option<i32>,
    pub page_range: PageRange,
    pub publisher: Option<String>,
    pub subject: Option<String>,
    /// ISO 639-2 code.
    pub language: Option<String>,
}

impl BookFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.decade.is_none_or(|d| book.decade() == Some(d))
            && self.page_range.contains(book.median_pages)
            && self
                .publisher
                .as_deref()
                .is_none_or(|p| contains_ignore_case(&book.publishers, p))
            && self
                .subject
                .as_deref()
                .is_none_or(|s| contains_ignore_case(&book.subjects, s))
            && self
                .language
                .as_deref()
                .is_none_or(|l| contains_ignore_case(&book.languages, l))
    }

    /// Books passing every constraint, in input order.
    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        books.iter().filter(|b| self.matches(b)).cloned().collect()
    }
}

fn contains_ignore_case(values: &[String], wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    values.iter().any(|v| v.to_lowercase() == wanted)
}

/// Values available for each filter, derived from a result page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub decades: Vec<i32>,
    pub publishers: Vec<String>,
    pub subjects: Vec<String>,
    pub languages: Vec<String>,
}

impl FilterOptions {
    pub fn from_books(books: &[Book]) -> Self {
        let decades: BTreeSet<i32> = books.iter().filter_map(Book::decade).collect();
        let publishers: BTreeSet<&str> = books
            .iter()
            .flat_map(|b| b.publishers.iter().map(String::as_str))
            .collect();
        let subjects: BTreeSet<&str> = books
            .iter()
            .flat_map(|b| b.subjects.iter().map(String::as_str))
            .collect();
        let languages: BTreeSet<&str> = books
            .iter()
            .flat_map(|b| b.languages.iter().map(String::as_str))
            .collect();

        Self {
            decades: decades.into_iter().collect(),
            publishers: publishers.into_iter().map(ToOwned::to_owned).collect(),
            subjects: subjects.into_iter().map(ToOwned::to_owned).collect(),
            languages: languages.into_iter().map(ToOwned::to_owned).collect(),
        }
    }
}
