//! SeaORM entities for the chat tables.

pub mod conversation_participants;
pub mod conversations;
pub mod messages;
pub mod usuarios;
