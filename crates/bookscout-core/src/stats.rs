//! Aggregate statistics over a result page.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::Book;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecadeBucket {
    pub decade: i32,
    pub count: usize,
}

impl DecadeBucket {
    pub fn label(&self) -> String {
        format!("{}s", self.decade)
    }
}

/// Books per decade of first publication, ascending. Books without a year are skipped.
pub fn decade_histogram(books: &[Book]) -> Vec<DecadeBucket> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for decade in books.iter().filter_map(Book::decade) {
        *counts.entry(decade).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(decade, count)| DecadeBucket { decade, count })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LibraryStats {
    pub total: usize,
    pub with_year: usize,
    pub oldest_year: Option<i32>,
    pub newest_year: Option<i32>,
    pub average_pages: Option<f64>,
    /// `(author, book count)`, most frequent first, ties by name.
    pub top_authors: Vec<(String, usize)>,
    pub decades: Vec<DecadeBucket>,
}

impl LibraryStats {
    const TOP_AUTHORS: usize = 5;

    pub fn compute(books: &[Book]) -> Self {
        let years: Vec<i32> = books.iter().filter_map(|b| b.first_publish_year).collect();
        let pages: Vec<u32> = books.iter().filter_map(|b| b.median_pages).collect();

        let average_pages = if pages.is_empty() {
            None
        } else {
            Some(pages.iter().map(|&p| f64::from(p)).sum::<f64>() / pages.len() as f64)
        };

        let mut by_author: HashMap<&str, usize> = HashMap::new();
        for author in books.iter().flat_map(|b| b.authors.iter()) {
            *by_author.entry(author.as_str()).or_default() += 1;
        }
        let mut top_authors: Vec<(String, usize)> = by_author
            .into_iter()
            .map(|(a, n)| (a.to_string(), n))
            .collect();
        top_authors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_authors.truncate(Self::TOP_AUTHORS);

        Self {
            total: books.len(),
            with_year: years.len(),
            oldest_year: years.iter().copied().min(),
            newest_year: years.iter().copied().max(),
            average_pages,
            top_authors,
            decades: decade_histogram(books),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_books;

    #[test]
    fn test_histogram_sample() {
        let hist = decade_histogram(&sample_books());
        let decades: Vec<i32> = hist.iter().map(|b| b.decade).collect();
        assert_eq!(decades, vec![1890, 1920, 1930, 1940, 1950]);
        let fifties = hist.iter().find(|b| b.decade == 1950).unwrap();
        assert_eq!(fifties.count, 2);
        assert_eq!(fifties.label(), "1950s");
    }

    #[test]
    fn test_histogram_skips_unknown_year() {
        let books = vec![Book::new("a", "a")];
        assert!(decade_histogram(&books).is_empty());
    }

    #[test]
    fn test_stats_sample() {
        let stats = LibraryStats::compute(&sample_books());
        assert_eq!(stats.total, 8);
        assert_eq!(stats.with_year, 8);
        assert_eq!(stats.oldest_year, Some(1899));
        assert_eq!(stats.newest_year, Some(1956));
        assert!(stats.average_pages.unwrap() > 0.0);
        assert_eq!(stats.top_authors.len(), 5);
    }

    #[test]
    fn test_stats_empty() {
        let stats = LibraryStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_pages, None);
        assert!(stats.decades.is_empty());
    }
}
