use std::cell::RefCell;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A single persisted value, read once at startup and rewritten whole on change.
pub trait PersistedStore<T> {
    fn load(&self) -> Result<T>;
    fn save(&self, value: &T) -> Result<()>;
}

// ─── JSON file ─────────────────────────────────────────────

/// Stores a value as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> PersistedStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Missing file yields the default value. A corrupt file is logged and
    /// also yields the default, so a bad write never locks the user out.
    fn load(&self) -> Result<T> {
        if !self.path.exists() {
            return Ok(T::default());
        }
        let bytes = fs::read(&self.path)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("ignoring unreadable store {}: {e}", self.path.display());
                Ok(T::default())
            }
        }
    }

    fn save(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

// ─── In-memory ─────────────────────────────────────────────

/// Keeps the value in memory. Used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    value: RefCell<T>,
    saves: RefCell<usize>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            saves: RefCell::new(0),
        }
    }

    /// Current stored value.
    pub fn snapshot(&self) -> T {
        self.value.borrow().clone()
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl<T: Clone> PersistedStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<T> {
        Ok(self.value.borrow().clone())
    }

    fn save(&self, value: &T) -> Result<()> {
        *self.value.borrow_mut() = value.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

impl<T, S: PersistedStore<T> + ?Sized> PersistedStore<T> for &S {
    fn load(&self) -> Result<T> {
        (**self).load()
    }

    fn save(&self, value: &T) -> Result<()> {
        (**self).save(value)
    }
}
