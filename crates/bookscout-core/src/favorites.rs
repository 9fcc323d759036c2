use crate::error::Result;
use crate::models::Book;
use crate::storage::PersistedStore;

/// Bookmarked books, keyed by `Book::key`. Written back on every change.
pub struct Favorites<S> {
    store: S,
    books: Vec<Book>,
}

impl<S: PersistedStore<Vec<Book>>> Favorites<S> {
    /// Load favorites from `store`, dropping any duplicate keys.
    pub fn load(store: S) -> Result<Self> {
        let mut books: Vec<Book> = Vec::new();
        for book in store.load()? {
            if !books.iter().any(|b| b.key == book.key) {
                books.push(book);
            }
        }
        Ok(Self { store, books })
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.books.iter().any(|b| b.key == key)
    }

    /// Add `book` if absent, remove it if present. Returns whether it is now a favorite.
    /// The in-memory set only changes once the store accepted the write.
    pub fn toggle(&mut self, book: &Book) -> Result<bool> {
        let mut books = self.books.clone();
        let now_favorite = if let Some(pos) = books.iter().position(|b| b.key == book.key) {
            books.remove(pos);
            false
        } else {
            books.push(book.clone());
            true
        };
        self.store.save(&books)?;
        self.books = books;
        Ok(now_favorite)
    }

    pub fn get(&self, key: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.key == key)
    }

    pub fn list(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
