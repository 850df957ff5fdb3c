//! SeaORM Entity for votes table
//!
//! Votes keep non-owning references; deleting a poll or option nulls them.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub poll_id: Option<i32>,
    pub poll_option_id: Option<i32>,
    /// Recorded for reference only. Not used to deduplicate votes.
    pub ip_address: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::polls::Entity",
        from = "Column::PollId",
        to = "super::polls::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Poll,
    #[sea_orm(
        belongs_to = "super::poll_options::Entity",
        from = "Column::PollOptionId",
        to = "super::poll_options::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    PollOption,
}

impl Related<super::polls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::poll_options::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PollOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
