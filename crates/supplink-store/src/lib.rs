//! supplink-store - Filesystem-backed session storage.
//!
//! Sessions are kept in a [`KeyValueScope`], one JSON file per API origin,
//! so a session issued by one API is never replayed against another.

mod scope;
mod token_store;

pub use scope::KeyValueScope;
pub use token_store::{ACCESS_TOKEN_KEY, FileTokenStore, REFRESH_TOKEN_KEY, USER_KEY};
