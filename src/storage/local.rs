//! Local filesystem storage backend.

use super::{validate_key, StorageBackend, StorageError};
use actix_web::web;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

/// Local filesystem storage backend.
pub struct LocalStorage {
    /// Base path for file storage
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend.
    ///
    /// The `base_path` directory will be created if it doesn't exist.
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;
        log::info!("LocalStorage initialized at {:?}", base_path);
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Files are stored flat so the directory can be served as-is.
    fn get_file_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        validate_key(filename)?;
        Ok(self.base_path.join(filename))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn put_object(&self, data: Vec<u8>, filename: &str) -> Result<(), StorageError> {
        let path = self.get_file_path(filename)?;
        log::info!("LocalStorage: put_object: {:?}", path);

        // Use web::block for blocking file operations
        web::block(move || {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, data)
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        Ok(())
    }

    async fn delete_object(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.get_file_path(filename)?;
        log::debug!("LocalStorage: delete_object: {:?}", path);

        let result = web::block(move || fs::remove_file(&path))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.get_file_path(filename)?;
        Ok(path.exists())
    }
}
