//! The active session value.

use crate::tokens::{AccessToken, RefreshToken};
use crate::types::{Role, UserProfile};

/// The pairing of an access credential and the cached user profile.
///
/// There is at most one `Session` per storage scope. It is created on a
/// successful login or registration and replaced wholesale afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    pub profile: UserProfile,
}

impl Session {
    pub fn new(
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
        profile: UserProfile,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            profile,
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }
}
