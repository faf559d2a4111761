//! Durable client-local storage for the cart record.
//!
//! The whole item list is one record under one key; reads and writes are
//! always whole-record, never field-level. The trait is the seam the store
//! uses so tests (and any embedding) can swap the backend.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("cart record could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Whole-record load/save of the serialized cart list.
pub trait CartStorage {
    /// Read the record. `Ok(None)` means no record has ever been written.
    fn load(&self) -> Result<Option<String>, StorageError>;
    /// Replace the record with the given payload.
    fn save(&self, payload: &str) -> Result<(), StorageError>;
}

/// One JSON file at a fixed path — the crate's stand-in for per-browser
/// localStorage.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// In-memory backend with a shared handle: clones see the same record, which
/// lets tests observe writes and simulate a second browsing context.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record contents, for assertions.
    pub fn contents(&self) -> Option<String> {
        self.inner.borrow().clone()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.inner.borrow().clone())
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        *self.inner.borrow_mut() = Some(payload.to_string());
        Ok(())
    }
}
