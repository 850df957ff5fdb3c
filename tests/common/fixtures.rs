//! Test fixtures for creating test data
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use votebox::orm::{poll_options, polls, users, votes};
use votebox::poll::image::{ImageKind, ValidImage};
use votebox::poll::{create_poll, NewOption, NewPoll};
use votebox::storage::{StorageBackend, StorageError};

/// Smallest byte string that is detected as a PNG.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";

/// Test user fixture
pub struct TestUser {
    pub id: i32,
    pub username: String,
    pub password: String, // Plain text password for testing
}

/// Create a test user with known credentials
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<TestUser, DbErr> {
    let password_hash = votebox::session::hash_password(password)
        .map_err(|e| DbErr::Custom(format!("Password hashing failed: {}", e)))?;
    let user = votebox::user::insert_new_user(db, username, &password_hash).await?;

    Ok(TestUser {
        id: user.id,
        username: user.name,
        password: password.to_owned(),
    })
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// A poll with `option_names` that opened an hour ago and closes tomorrow.
pub fn open_poll(name: &str, option_names: &[&str]) -> NewPoll {
    poll_between(name, option_names, now() - Duration::hours(1), now() + Duration::days(1))
}

pub fn poll_between(
    name: &str,
    option_names: &[&str],
    starts_at: NaiveDateTime,
    ends_at: NaiveDateTime,
) -> NewPoll {
    NewPoll {
        name: name.to_owned(),
        starts_at,
        ends_at,
        options: option_names
            .iter()
            .map(|option| NewOption {
                name: (*option).to_owned(),
                description: format!("All about {}", option),
                image: ValidImage {
                    kind: ImageKind::Png,
                    data: PNG_BYTES.to_vec(),
                },
            })
            .collect(),
    }
}

/// Persists `poll` for `creator_id` and returns it with its options.
pub async fn create_test_poll(
    db: &DatabaseConnection,
    storage: &dyn StorageBackend,
    creator_id: i32,
    poll: NewPoll,
) -> (polls::Model, Vec<poll_options::Model>) {
    let poll = create_poll(db, storage, creator_id, poll)
        .await
        .expect("create_poll");
    let options = votebox::poll::options_for_poll(db, poll.id)
        .await
        .expect("options_for_poll");
    (poll, options)
}

pub async fn reload_poll(db: &DatabaseConnection, id: i32) -> polls::Model {
    polls::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("poll query")
        .expect("poll exists")
}

pub async fn count_polls(db: &DatabaseConnection) -> usize {
    polls::Entity::find().all(db).await.expect("polls").len()
}

pub async fn count_options(db: &DatabaseConnection) -> usize {
    poll_options::Entity::find()
        .all(db)
        .await
        .expect("options")
        .len()
}

pub async fn votes_for_poll(db: &DatabaseConnection, poll_id: i32) -> Vec<votes::Model> {
    votes::Entity::find()
        .filter(votes::Column::PollId.eq(poll_id))
        .all(db)
        .await
        .expect("votes")
}

pub async fn count_users(db: &DatabaseConnection) -> usize {
    users::Entity::find().all(db).await.expect("users").len()
}

/// Storage that accepts `succeed` writes and fails every write after that.
pub struct FailingStorage {
    pub inner: Arc<dyn StorageBackend>,
    pub succeed: usize,
    writes: AtomicUsize,
}

impl FailingStorage {
    pub fn new(inner: Arc<dyn StorageBackend>, succeed: usize) -> Self {
        Self {
            inner,
            succeed,
            writes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StorageBackend for FailingStorage {
    async fn put_object(&self, data: Vec<u8>, filename: &str) -> Result<(), StorageError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) >= self.succeed {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.inner.put_object(data, filename).await
    }

    async fn delete_object(&self, filename: &str) -> Result<(), StorageError> {
        self.inner.delete_object(filename).await
    }

    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        self.inner.exists(filename).await
    }
}
