use super::{find_poll_by_code, PollPhase};
use crate::orm::{poll_options, polls, votes};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, DatabaseConnection, DatabaseTransaction, DbErr,
    TransactionTrait,
};

/// Reasons a vote is refused.
#[derive(Debug)]
pub enum VoteError {
    PollNotFound,
    /// The option does not exist or belongs to a different poll
    InvalidOption(i32),
    /// The poll is not taking votes right now
    NotOpen(PollPhase),
    Database(DbErr),
}

impl std::fmt::Display for VoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteError::PollNotFound => write!(f, "poll not found"),
            VoteError::InvalidOption(id) => write!(f, "option {} is not part of this poll", id),
            VoteError::NotOpen(PollPhase::Upcoming) => write!(f, "this poll has not started yet"),
            VoteError::NotOpen(PollPhase::Ended) => write!(f, "this poll has ended"),
            VoteError::NotOpen(phase) => write!(f, "this poll is {}", phase),
            VoteError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for VoteError {}

impl From<DbErr> for VoteError {
    fn from(e: DbErr) -> Self {
        VoteError::Database(e)
    }
}

impl VoteError {
    /// Whether the message may be shown to the voter as is.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, VoteError::Database(_))
    }
}

/// Records one vote for `option_id` on the poll `code`.
///
/// The option check, the vote row and the counter increment happen in one
/// transaction; on any error nothing is written.
pub async fn cast_vote(
    db: &DatabaseConnection,
    code: &str,
    option_id: i32,
    ip_address: Option<String>,
) -> Result<votes::Model, VoteError> {
    let txn = db.begin().await?;

    match record_vote(&txn, code, option_id, ip_address).await {
        Ok(vote) => {
            txn.commit().await?;
            Ok(vote)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                log::error!("cast_vote: rollback failed: {}", rollback);
            }
            Err(e)
        }
    }
}

async fn record_vote(
    txn: &DatabaseTransaction,
    code: &str,
    option_id: i32,
    ip_address: Option<String>,
) -> Result<votes::Model, VoteError> {
    let poll = find_poll_by_code(txn, code)
        .await?
        .ok_or(VoteError::PollNotFound)?;

    poll_options::Entity::find_by_id(option_id)
        .filter(poll_options::Column::PollId.eq(poll.id))
        .one(txn)
        .await?
        .ok_or(VoteError::InvalidOption(option_id))?;

    let phase = PollPhase::now(&poll);
    if !phase.accepts_votes() {
        return Err(VoteError::NotOpen(phase));
    }

    let vote = votes::ActiveModel {
        poll_id: Set(Some(poll.id)),
        poll_option_id: Set(Some(option_id)),
        ip_address: Set(ip_address),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    polls::Entity::update_many()
        .col_expr(
            polls::Column::TotalVotes,
            Expr::col(polls::Column::TotalVotes).add(1),
        )
        .filter(polls::Column::Id.eq(poll.id))
        .exec(txn)
        .await?;

    Ok(vote)
}
