//! Process-local token store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::session::Session;
use crate::tokens::{AccessToken, RefreshToken};
use crate::traits::TokenStore;
use crate::types::UserProfile;
use crate::Result;

/// A [`TokenStore`] that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slots: RwLock<Slots>,
}

#[derive(Debug, Default)]
struct Slots {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    profile: Option<UserProfile>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with a session.
    pub fn with_session(session: &Session) -> Self {
        let store = Self::new();
        store.write().replace(session);
        store
    }

    // A panic while holding the lock cannot leave the slots half-written,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Slots {
    fn replace(&mut self, session: &Session) {
        self.access_token = Some(session.access_token.clone());
        self.refresh_token = session.refresh_token.clone();
        self.profile = Some(session.profile.clone());
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, session: &Session) -> Result<()> {
        self.write().replace(session);
        Ok(())
    }

    fn store_tokens(&self, access: &AccessToken, refresh: Option<&RefreshToken>) -> Result<()> {
        let mut slots = self.write();
        slots.access_token = Some(access.clone());
        if let Some(refresh) = refresh {
            slots.refresh_token = Some(refresh.clone());
        }
        Ok(())
    }

    fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write().profile = Some(profile.clone());
        Ok(())
    }

    fn load_credential(&self) -> Option<AccessToken> {
        self.read().access_token.clone()
    }

    fn load_refresh_token(&self) -> Option<RefreshToken> {
        self.read().refresh_token.clone()
    }

    fn load_profile(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    fn clear(&self) {
        *self.write() = Slots::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn session() -> Session {
        Session::new(
            AccessToken::new("access"),
            Some(RefreshToken::new("refresh")),
            UserProfile {
                id: 1,
                name: "Ada".to_string(),
                email: "a@b.com".to_string(),
                role: Role::Consumer,
            },
        )
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryTokenStore::new();
        store.save(&session()).unwrap();
        assert_eq!(store.load_credential(), Some(AccessToken::new("access")));
        assert_eq!(store.load_profile(), Some(session().profile));
        assert_eq!(store.load_session(), Some(session()));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = MemoryTokenStore::with_session(&session());
        store.clear();
        store.clear();
        assert!(store.load_credential().is_none());
        assert!(store.load_refresh_token().is_none());
        assert!(store.load_profile().is_none());
    }

    #[test]
    fn store_tokens_keeps_refresh_when_not_rotated() {
        let store = MemoryTokenStore::with_session(&session());
        store.store_tokens(&AccessToken::new("next"), None).unwrap();
        assert_eq!(store.load_credential(), Some(AccessToken::new("next")));
        assert_eq!(store.load_refresh_token(), Some(RefreshToken::new("refresh")));
        assert!(store.load_profile().is_some());
    }

    #[test]
    fn save_without_refresh_drops_old_one() {
        let store = MemoryTokenStore::with_session(&session());
        let mut next = session();
        next.refresh_token = None;
        store.save(&next).unwrap();
        assert!(store.load_refresh_token().is_none());
    }
}
