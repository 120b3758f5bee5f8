//! Application-wide constants

/// Role string the login system stores in `usuarios.role` for administrators.
/// Used as the default for `chat.admin_role`.
pub const ADMIN_ROLE: &str = "admin";

/// Prefix of generated room labels: `chat_<user_a>_<user_b>`.
pub const ROOM_LABEL_PREFIX: &str = "chat";

/// Maximum length for a chat message in characters
pub const MAX_MESSAGE_LENGTH: usize = 5_000;

