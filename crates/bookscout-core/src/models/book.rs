use serde::{Deserialize, Serialize};

// ─── Book ───────────────────────────────────────────────────

/// A catalog record as returned by a search.
///
/// Records are never edited client-side; a new fetch replaces them wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// External identifier, e.g. `/works/OL27448W`.
    pub key: String,

    pub title: String,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_id: Option<i64>,

    /// Median page count across editions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_pages: Option<u32>,

    #[serde(default)]
    pub publishers: Vec<String>,

    #[serde(default)]
    pub edition_count: u32,

    #[serde(default)]
    pub subjects: Vec<String>,

    /// ISO 639-2 language codes (`eng`, `por`, ...).
    #[serde(default)]
    pub languages: Vec<String>,
}

impl Book {
    /// Create a record with only the identifying fields set.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            authors: Vec::new(),
            first_publish_year: None,
            cover_id: None,
            median_pages: None,
            publishers: Vec::new(),
            edition_count: 0,
            subjects: Vec::new(),
            languages: Vec::new(),
        }
    }

    /// Decade of first publication (`1954` → `1950`).
    pub fn decade(&self) -> Option<i32> {
        self.first_publish_year.map(|y| y.div_euclid(10) * 10)
    }

    /// Case-insensitive substring match against title and author names.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .authors
                .iter()
                .any(|a| a.to_lowercase().contains(needle))
    }
}
