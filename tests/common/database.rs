//! Test database setup
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};

/// Fresh in-memory SQLite database with the user and chat tables created.
///
/// Every call returns an isolated database, so tests can run in parallel.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let db = chatdesk::db::connect("sqlite::memory:").await?;
    chatdesk::db::create_user_table(&db).await?;
    chatdesk::db::create_chat_tables(&db).await?;
    Ok(db)
}
