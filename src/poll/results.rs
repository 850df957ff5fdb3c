use crate::orm::{poll_options, votes};
use sea_orm::{entity::*, query::*, sea_query::Expr, ConnectionTrait, DbErr, FromQueryResult};
use std::collections::BTreeMap;

/// Aggregated votes of one poll.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollResults {
    pub total_votes: i64,
    /// Vote count per option id. Every option of the poll has an entry.
    pub votes_per_option: BTreeMap<i32, i64>,
}

#[derive(Debug, FromQueryResult)]
struct OptionVotes {
    poll_option_id: Option<i32>,
    votes: i64,
}

impl PollResults {
    pub fn votes_for(&self, option_id: i32) -> i64 {
        self.votes_per_option.get(&option_id).copied().unwrap_or(0)
    }

    /// Share of the total in percent, rounded to one decimal.
    pub fn percentage(&self, option_id: i32) -> f64 {
        if self.total_votes == 0 {
            return 0.0;
        }
        let share = self.votes_for(option_id) as f64 * 100.0 / self.total_votes as f64;
        (share * 10.0).round() / 10.0
    }

    /// Options with the highest count. Empty while nobody has voted.
    pub fn leaders(&self) -> Vec<i32> {
        let top = self.votes_per_option.values().copied().max().unwrap_or(0);
        if top == 0 {
            return Vec::new();
        }
        self.votes_per_option
            .iter()
            .filter(|(_, count)| **count == top)
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn is_leader(&self, option_id: i32) -> bool {
        self.leaders().contains(&option_id)
    }
}

/// Counts the votes of `poll_id`, grouped by option.
///
/// `options` seeds the map so options nobody picked report zero. Votes whose
/// option was removed still count toward the total.
pub async fn tally<C: ConnectionTrait>(
    db: &C,
    poll_id: i32,
    options: &[poll_options::Model],
) -> Result<PollResults, DbErr> {
    let mut results = PollResults {
        total_votes: 0,
        votes_per_option: options.iter().map(|option| (option.id, 0)).collect(),
    };

    let rows = votes::Entity::find()
        .select_only()
        .column(votes::Column::PollOptionId)
        .column_as(Expr::col(votes::Column::Id).count(), "votes")
        .filter(votes::Column::PollId.eq(poll_id))
        .group_by(votes::Column::PollOptionId)
        .into_model::<OptionVotes>()
        .all(db)
        .await?;

    for row in rows {
        results.total_votes += row.votes;
        if let Some(option_id) = row.poll_option_id {
            results.votes_per_option.insert(option_id, row.votes);
        }
    }

    Ok(results)
}
