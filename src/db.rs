//! Database connection and schema setup.

use crate::orm::{conversation_participants, conversations, messages, usuarios};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

/// Open a connection pool for `database_url`.
///
/// SQLite URLs get a single connection so in-memory databases are shared by
/// every query issued through the pool.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    if database_url.starts_with("sqlite:") {
        options.max_connections(1);
    }
    let db = Database::connect(options).await?;
    log::info!("Connected to {:?} database", db.get_database_backend());
    Ok(db)
}

/// Create the tables owned by the chat if they are missing.
pub async fn create_chat_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, conversations::Entity).await?;
    create_table(db, conversation_participants::Entity).await?;
    create_table(db, messages::Entity).await?;
    Ok(())
}

/// Create the `usuarios` table. Production deployments get it from the login
/// system; tests and fresh development databases need it created here.
pub async fn create_user_table(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, usuarios::Entity).await
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}
