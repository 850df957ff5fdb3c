//! Storage backend abstraction for uploaded option images.
//!
//! The local backend writes into the public images directory, which the web
//! layer serves under `/images`.

pub mod local;

use async_trait::async_trait;

pub use local::LocalStorage;

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// File not found
    NotFound(String),
    /// Filename would escape the storage root
    InvalidName(String),
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::InvalidName(name) => write!(f, "Invalid filename: {:?}", name),
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Trait for storage backends.
///
/// Keys are bare filenames; backends decide where they live.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file, replacing any file with the same name.
    async fn put_object(&self, data: Vec<u8>, filename: &str) -> Result<(), StorageError>;

    /// Remove a file. Removing a missing file is not an error.
    async fn delete_object(&self, filename: &str) -> Result<(), StorageError>;

    /// Check if a file exists.
    async fn exists(&self, filename: &str) -> Result<bool, StorageError>;
}

/// Rejects names that are empty or could address something outside the root.
pub fn validate_key(filename: &str) -> Result<(), StorageError> {
    let valid = !filename.is_empty()
        && !filename.starts_with('.')
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(filename.to_owned()))
    }
}
