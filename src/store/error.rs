use std::fmt;
use std::path::{Path, PathBuf};

/// Error type for person store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this id already exists.
    DuplicateId(i64),
    /// No record with this id exists.
    NotFound(i64),
    /// Reading, writing or encoding the backing file failed.
    Storage { path: PathBuf, message: String },
    /// The backing file exists but does not hold a valid people document.
    CorruptStore { path: PathBuf, message: String },
    /// A thread panicked while holding the collection lock.
    LockPoisoned(&'static str),
}

impl StoreError {
    pub(crate) fn storage(path: &Path, err: impl fmt::Display) -> Self {
        StoreError::Storage {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn corrupt(path: &Path, err: impl fmt::Display) -> Self {
        StoreError::CorruptStore {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateId(id) => {
                write!(f, "there is a person with id {} already registered", id)
            }
            StoreError::NotFound(id) => write!(f, "person {} not found", id),
            StoreError::Storage { path, message } => {
                write!(f, "storage error on {}: {}", path.display(), message)
            }
            StoreError::CorruptStore { path, message } => {
                write!(f, "corrupt store file {}: {}", path.display(), message)
            }
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {}
