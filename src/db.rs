//! Database connection and schema bootstrap.

use crate::orm::{poll_options, polls, users, votes};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

/// Opens a connection pool for `database_url`.
///
/// Postgres URLs are used in production. SQLite (`sqlite://path?mode=rwc`) works for
/// local development and the integration tests.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    log::info!("Connected to {:?} database", db.get_database_backend());
    Ok(db)
}

/// Creates every table that does not exist yet.
///
/// Tables are created parent-first so foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, polls::Entity).await?;
    create_table(db, poll_options::Entity).await?;
    create_table(db, votes::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();

    db.execute(backend.build(&stmt)).await?;
    log::debug!("Ensured table {}", entity.table_name());
    Ok(())
}
