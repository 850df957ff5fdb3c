use crate::orm::users;
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, ConnectionTrait, DbErr};

/// A user as seen by request handlers and templates.
#[derive(Clone, Debug)]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<users::Model> for Profile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

impl Profile {
    /// Returns a user profile by id.
    pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Self>, DbErr> {
        Ok(users::Entity::find_by_id(id).one(db).await?.map(Self::from))
    }
}

/// Looks a user up by name. Names are compared case-insensitively.
pub async fn find_user_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Name.eq(name.trim().to_lowercase()))
        .one(db)
        .await
}

/// Inserts a user with an already hashed password. Names are stored lowercased.
pub async fn insert_new_user<C: ConnectionTrait>(
    db: &C,
    name: &str,
    password_hash: &str,
) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        name: Set(name.trim().to_lowercase()),
        password: Set(password_hash.to_owned()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}
