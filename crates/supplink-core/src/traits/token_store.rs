//! Durable session storage trait.

use crate::session::Session;
use crate::tokens::{AccessToken, RefreshToken};
use crate::types::UserProfile;
use crate::Result;

/// Persists the current session in a durable key/value scope.
///
/// All operations are synchronous and local; none of them touch the network.
/// Loads return `None` both when nothing is stored and when the stored value
/// is unreadable, so a corrupt store behaves like a signed-out one.
pub trait TokenStore: Send + Sync {
    /// Store a whole session, replacing whatever was there.
    ///
    /// A session without a refresh token removes any previously stored one.
    fn save(&self, session: &Session) -> Result<()>;

    /// Replace the stored tokens, keeping the cached profile.
    ///
    /// A `None` refresh token keeps the one already stored.
    fn store_tokens(&self, access: &AccessToken, refresh: Option<&RefreshToken>) -> Result<()>;

    /// Replace the cached profile, keeping the tokens.
    fn store_profile(&self, profile: &UserProfile) -> Result<()>;

    /// The stored access credential, if any.
    fn load_credential(&self) -> Option<AccessToken>;

    /// The stored refresh credential, if any.
    fn load_refresh_token(&self) -> Option<RefreshToken>;

    /// The cached user profile, if any.
    fn load_profile(&self) -> Option<UserProfile>;

    /// Remove everything. Idempotent and infallible.
    fn clear(&self);

    /// The full stored session, if both credential and profile are present.
    fn load_session(&self) -> Option<Session> {
        let access_token = self.load_credential()?;
        let profile = self.load_profile()?;
        Some(Session::new(
            access_token,
            self.load_refresh_token(),
            profile,
        ))
    }
}
