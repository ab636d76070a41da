//! File-backed [`TokenStore`].

use std::path::Path;

use tracing::{debug, warn};

use supplink_core::error::{Error, StorageError};
use supplink_core::{AccessToken, ApiUrl, RefreshToken, Result, Session, TokenStore, UserProfile};

use crate::scope::KeyValueScope;

/// Key holding the access credential.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key holding the refresh credential.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key holding the serialized user profile.
pub const USER_KEY: &str = "user";

/// Session storage persisted in a [`KeyValueScope`].
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    scope: KeyValueScope,
}

impl FileTokenStore {
    pub fn new(scope: KeyValueScope) -> Self {
        Self { scope }
    }

    /// The store for an API origin under the given root directory.
    pub fn for_api(root: impl AsRef<Path>, api: &ApiUrl) -> Self {
        Self::new(KeyValueScope::for_api(root, api))
    }

    pub fn scope(&self) -> &KeyValueScope {
        &self.scope
    }

    fn encode_profile(profile: &UserProfile) -> Result<String> {
        serde_json::to_string(profile).map_err(|e| {
            Error::Storage(StorageError::Serialize {
                key: USER_KEY.to_string(),
                message: e.to_string(),
            })
        })
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, session: &Session) -> Result<()> {
        let user = Self::encode_profile(&session.profile)?;
        self.scope.update(&[
            (
                ACCESS_TOKEN_KEY,
                Some(session.access_token.as_str().to_string()),
            ),
            (
                REFRESH_TOKEN_KEY,
                session
                    .refresh_token
                    .as_ref()
                    .map(|t| t.as_str().to_string()),
            ),
            (USER_KEY, Some(user)),
        ])?;
        debug!(user_id = session.profile.id, "Session saved");
        Ok(())
    }

    fn store_tokens(&self, access: &AccessToken, refresh: Option<&RefreshToken>) -> Result<()> {
        let mut changes = vec![(ACCESS_TOKEN_KEY, Some(access.as_str().to_string()))];
        if let Some(refresh) = refresh {
            changes.push((REFRESH_TOKEN_KEY, Some(refresh.as_str().to_string())));
        }
        self.scope.update(&changes)
    }

    fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        let user = Self::encode_profile(profile)?;
        self.scope.set(USER_KEY, &user)
    }

    fn load_credential(&self) -> Option<AccessToken> {
        self.scope.get(ACCESS_TOKEN_KEY).map(AccessToken::new)
    }

    fn load_refresh_token(&self) -> Option<RefreshToken> {
        self.scope.get(REFRESH_TOKEN_KEY).map(RefreshToken::new)
    }

    fn load_profile(&self) -> Option<UserProfile> {
        let raw = self.scope.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached profile");
                None
            }
        }
    }

    fn clear(&self) {
        self.scope.clear();
    }
}
