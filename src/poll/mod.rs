//! Poll domain: status phases, lookups, creation, voting and tallies.

mod create;
pub mod image;
mod results;
mod vote;

pub use create::{create_poll, FieldErrors, NewOption, NewPoll, OptionForm, PollForm};
pub use results::{tally, PollResults};
pub use vote::{cast_vote, VoteError};

use crate::constants::POLL_CODE_LENGTH;
use crate::orm::{poll_options, polls};
use crate::storage::StorageError;
use chrono::{NaiveDateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ConnectionTrait, DbErr, FromQueryResult,
};
use std::collections::HashMap;

/// Phase a poll is in, derived at read time from its window and status flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollPhase {
    Upcoming,
    Ended,
    Closed,
    Active,
}

impl PollPhase {
    /// Classifies `poll` at `now`. The window is checked before the flag, so a
    /// closed poll past its end reads as ended.
    pub fn at(poll: &polls::Model, now: NaiveDateTime) -> Self {
        if now < poll.starts_at {
            PollPhase::Upcoming
        } else if now > poll.ends_at {
            PollPhase::Ended
        } else if poll.status == polls::Status::Closed {
            PollPhase::Closed
        } else {
            PollPhase::Active
        }
    }

    pub fn now(poll: &polls::Model) -> Self {
        Self::at(poll, Utc::now().naive_utc())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PollPhase::Upcoming => "upcoming",
            PollPhase::Ended => "ended",
            PollPhase::Closed => "closed",
            PollPhase::Active => "active",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PollPhase::Upcoming => "Upcoming",
            PollPhase::Ended => "Ended",
            PollPhase::Closed => "Closed",
            PollPhase::Active => "Active",
        }
    }

    pub fn accepts_votes(&self) -> bool {
        *self == PollPhase::Active
    }
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from creating or managing polls.
#[derive(Debug)]
pub enum PollError {
    /// No poll with the given code
    NotFound,
    /// Acting user did not create the poll
    NotCreator,
    /// Every generated short code was already taken
    CodeExhausted,
    Storage(StorageError),
    Database(DbErr),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::NotFound => write!(f, "poll not found"),
            PollError::NotCreator => write!(f, "only the creator of a poll may change it"),
            PollError::CodeExhausted => write!(f, "unable to allocate a unique poll code"),
            PollError::Storage(e) => write!(f, "storage error: {}", e),
            PollError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for PollError {}

impl From<DbErr> for PollError {
    fn from(e: DbErr) -> Self {
        PollError::Database(e)
    }
}

impl From<StorageError> for PollError {
    fn from(e: StorageError) -> Self {
        PollError::Storage(e)
    }
}

/// Random alphanumeric string of `len` characters.
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Draws a candidate short code. Uniqueness is checked by the caller.
pub fn generate_code() -> String {
    random_string(POLL_CODE_LENGTH)
}

pub async fn find_poll_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<Option<polls::Model>, DbErr> {
    polls::Entity::find()
        .filter(polls::Column::Code.eq(code))
        .one(db)
        .await
}

/// Options of a poll in the order they were submitted.
pub async fn options_for_poll<C: ConnectionTrait>(
    db: &C,
    poll_id: i32,
) -> Result<Vec<poll_options::Model>, DbErr> {
    poll_options::Entity::find()
        .filter(poll_options::Column::PollId.eq(poll_id))
        .order_by_asc(poll_options::Column::Id)
        .all(db)
        .await
}

/// A poll and its options, or `None` when the code is unknown.
pub async fn find_poll_with_options<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<Option<(polls::Model, Vec<poll_options::Model>)>, DbErr> {
    match find_poll_by_code(db, code).await? {
        Some(poll) => {
            let options = options_for_poll(db, poll.id).await?;
            Ok(Some((poll, options)))
        }
        None => Ok(None),
    }
}

/// Row on the creator's dashboard.
#[derive(Clone, Debug)]
pub struct PollSummary {
    pub poll: polls::Model,
    pub phase: PollPhase,
    pub option_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct OptionCount {
    poll_id: i32,
    option_count: i64,
}

/// Polls created by `user_id`, newest first.
pub async fn polls_for_creator<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    limit: u64,
) -> Result<Vec<PollSummary>, DbErr> {
    let polls = polls::Entity::find()
        .filter(polls::Column::CreatedBy.eq(user_id))
        .order_by_desc(polls::Column::CreatedAt)
        .order_by_desc(polls::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    if polls.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = polls.iter().map(|p| p.id).collect();
    let counts: HashMap<i32, i64> = poll_options::Entity::find()
        .select_only()
        .column(poll_options::Column::PollId)
        .column_as(Expr::col(poll_options::Column::Id).count(), "option_count")
        .filter(poll_options::Column::PollId.is_in(ids))
        .group_by(poll_options::Column::PollId)
        .into_model::<OptionCount>()
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.poll_id, row.option_count))
        .collect();

    let now = Utc::now().naive_utc();
    Ok(polls
        .into_iter()
        .map(|poll| PollSummary {
            phase: PollPhase::at(&poll, now),
            option_count: counts.get(&poll.id).copied().unwrap_or(0),
            poll,
        })
        .collect())
}

/// Sets the explicit status flag. Only the poll's creator may do this; the
/// window is not consulted.
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    code: &str,
    user_id: i32,
    status: polls::Status,
) -> Result<polls::Model, PollError> {
    let poll = find_poll_by_code(db, code)
        .await?
        .ok_or(PollError::NotFound)?;

    if poll.created_by != Some(user_id) {
        return Err(PollError::NotCreator);
    }

    let mut active: polls::ActiveModel = poll.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now().naive_utc());
    Ok(active.update(db).await?)
}
