use crate::error::Result;
use crate::storage::PersistedStore;

pub const DEFAULT_MAX_SIZE: usize = 5;

/// Most-recent-first list of distinct search terms (case-insensitive).
pub struct SearchHistory<S> {
    store: S,
    terms: Vec<String>,
    max_size: usize,
}

impl<S: PersistedStore<Vec<String>>> SearchHistory<S> {
    /// Load saved terms, keeping the first of any entries that differ only in case.
    pub fn load(store: S, max_size: usize) -> Result<Self> {
        let mut terms: Vec<String> = Vec::new();
        for term in store.load()? {
            let lowered = term.to_lowercase();
            if !terms.iter().any(|t| t.to_lowercase() == lowered) {
                terms.push(term);
            }
        }
        terms.truncate(max_size);
        Ok(Self {
            store,
            terms,
            max_size,
        })
    }

    /// Record `term` at the front. An existing entry differing only in case is
    /// replaced by the new casing. Blank terms are ignored.
    pub fn add(&mut self, term: &str) -> Result<()> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }
        let lowered = term.to_lowercase();
        let mut terms = self.terms.clone();
        terms.retain(|t| t.to_lowercase() != lowered);
        terms.insert(0, term.to_string());
        terms.truncate(self.max_size);
        self.store.save(&terms)?;
        self.terms = terms;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.save(&Vec::new())?;
        self.terms.clear();
        Ok(())
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;

    struct ReadOnlyStore(Vec<String>);

    impl PersistedStore<Vec<String>> for ReadOnlyStore {
        fn load(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }

        fn save(&self, _value: &Vec<String>) -> Result<()> {
            Err(CoreError::Io(std::io::Error::other("read-only")))
        }
    }

    #[test]
    fn test_case_variant_moves_to_front() {
        let store = MemoryStore::new(Vec::<String>::new());
        let mut history = SearchHistory::load(&store, DEFAULT_MAX_SIZE).unwrap();

        history.add("Tolkien").unwrap();
        history.add("tolkien").unwrap();

        assert_eq!(history.terms(), ["tolkien"]);
        assert_eq!(store.snapshot(), vec!["tolkien".to_string()]);
    }

    #[test]
    fn test_existing_term_moves_to_front() {
        let store = MemoryStore::new(Vec::<String>::new());
        let mut history = SearchHistory::load(&store, DEFAULT_MAX_SIZE).unwrap();
        history.add("dune").unwrap();
        history.add("emma").unwrap();
        history.add("Dune").unwrap();
        assert_eq!(history.terms(), ["Dune", "emma"]);
    }

    #[test]
    fn test_drops_oldest_over_capacity() {
        let store = MemoryStore::new(Vec::<String>::new());
        let mut history = SearchHistory::load(&store, 3).unwrap();
        for term in ["a", "b", "c", "d"] {
            history.add(term).unwrap();
        }
        assert_eq!(history.terms(), ["d", "c", "b"]);
    }

    #[test]
    fn test_blank_ignored() {
        let store = MemoryStore::new(Vec::<String>::new());
        let mut history = SearchHistory::load(&store, 5).unwrap();
        history.add("   ").unwrap();
        assert!(history.terms().is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_clear() {
        let store = MemoryStore::new(vec!["x".to_string()]);
        let mut history = SearchHistory::load(&store, 5).unwrap();
        history.clear().unwrap();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_load_drops_case_duplicates() {
        let store = MemoryStore::new(vec![
            "Dune".to_string(),
            "emma".to_string(),
            "dune".to_string(),
        ]);
        let history = SearchHistory::load(&store, 5).unwrap();
        assert_eq!(history.terms(), ["Dune", "emma"]);
    }

    #[test]
    fn test_failed_save_keeps_terms() {
        let mut history =
            SearchHistory::load(ReadOnlyStore(vec!["dune".to_string()]), 5).unwrap();

        assert!(history.add("emma").is_err());
        assert_eq!(history.terms(), ["dune"]);

        assert!(history.clear().is_err());
        assert_eq!(history.terms(), ["dune"]);
    }
}
