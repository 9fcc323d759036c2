//! Display helpers for book fields.

/// Cover image size accepted by the covers service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl CoverSize {
    fn code(self) -> char {
        match self {
            Self::Small => 'S',
            Self::Medium => 'M',
            Self::Large => 'L',
        }
    }
}

pub fn cover_url(cover_id: Option<i64>, size: CoverSize) -> Option<String> {
    cover_id.map(|id| format!("https://covers.openlibrary.org/b/id/{id}-{}.jpg", size.code()))
}

pub fn format_authors(authors: &[String]) -> String {
    match authors {
        [] => "Unknown author".to_string(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [a, b, ..] => format!("{a}, {b} and others"),
    }
}

pub fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string())
        .unwrap_or_else(|| "Unknown year".to_string())
}

pub fn format_pages(pages: Option<u32>) -> String {
    match pages {
        Some(p) if p > 0 => format!("{p} pages"),
        _ => "Page count unavailable".to_string(),
    }
}

pub fn format_publisher(publishers: &[String]) -> String {
    publishers
        .first()
        .cloned()
        .unwrap_or_else(|| "Publisher unavailable".to_string())
}

/// Cut `text` to `max_chars` characters, appending `...` when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// English name for an ISO 639-2 code; unknown codes are returned as-is.
pub fn language_name(code: &str) -> &str {
    match code {
        "eng" => "English",
        "por" => "Portuguese",
        "spa" => "Spanish",
        "fre" | "fra" => "French",
        "ger" | "deu" => "German",
        "ita" => "Italian",
        "rus" => "Russian",
        "jpn" => "Japanese",
        "chi" | "zho" => "Chinese",
        "ara" => "Arabic",
        "dut" | "nld" => "Dutch",
        "pol" => "Polish",
        "swe" => "Swedish",
        "lat" => "Latin",
        "gre" | "ell" => "Greek",
        "heb" => "Hebrew",
        "kor" => "Korean",
        "tur" => "Turkish",
        other => other,
    }
}
