//! Identity stored in the cookie session.
//!
//! Logging in is the job of an external login system. It calls
//! [`remember_user`] once the user is authenticated; the chat only ever reads
//! the id back with [`get_user_id`].

use actix_session::{Session, SessionGetError, SessionInsertError};

/// Session key holding the authenticated user's id.
pub const USER_ID_KEY: &str = "user_id";

/// Store `user_id` as the authenticated user of this session.
pub fn remember_user(session: &Session, user_id: i32) -> Result<(), SessionInsertError> {
    session.renew();
    session.insert(USER_ID_KEY, user_id)
}

/// Drop the authenticated identity and everything else in the session.
pub fn forget_user(session: &Session) {
    session.purge();
}

/// Returns the authenticated user's id, or None for guests.
pub fn get_user_id(session: &Session) -> Result<Option<i32>, SessionGetError> {
    session.get::<i32>(USER_ID_KEY)
}
