//! Test database setup and management
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Once};
use tempfile::TempDir;
use votebox::storage::{LocalStorage, StorageBackend};

static INIT_SYNC: Once = Once::new();

/// Initialize synchronous global state
fn init_sync_globals() {
    INIT_SYNC.call_once(|| {
        // Set SALT environment variable if not already set
        if env::var("SALT").is_err() {
            env::set_var("SALT", "testsaltfortestingonly1234567890AB");
        }
        votebox::app_config::init();
    });
}

/// One isolated database and image directory per test.
///
/// Both live in a temporary directory that is removed when the context drops.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub images: PathBuf,
    storage: Arc<LocalStorage>,
    _dir: TempDir,
}

impl TestContext {
    pub fn storage(&self) -> Arc<dyn StorageBackend> {
        self.storage.clone()
    }

    pub fn local_storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Number of files currently stored in the images directory.
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(&self.images)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Setup test database - create a fresh SQLite file with every table
pub async fn setup_test_database() -> Result<TestContext, DbErr> {
    init_sync_globals();

    let dir = tempfile::tempdir().map_err(|e| DbErr::Custom(e.to_string()))?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("votebox.db").display());
    let db = votebox::db::connect(&url).await?;
    votebox::db::create_tables(&db).await?;

    let images = dir.path().join("images");
    let storage = LocalStorage::new(images.clone()).map_err(|e| DbErr::Custom(e.to_string()))?;

    Ok(TestContext {
        db,
        images,
        storage: Arc::new(storage),
        _dir: dir,
    })
}
