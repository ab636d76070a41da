//! Attaches the stored credential to outgoing requests.

use std::sync::Arc;

use reqwest::header::HeaderValue;
use tracing::{debug, warn};

use supplink_core::TokenStore;

use crate::client::bearer_header;

/// Reads the current credential from the store for every request.
///
/// The credential is looked up at send time, never cached, so a refresh that
/// lands between two requests is picked up by the second one.
#[derive(Clone)]
pub struct RequestAuthenticator {
    store: Arc<dyn TokenStore>,
}

impl RequestAuthenticator {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// The `Authorization` header for the next request, if a usable
    /// credential is stored. No credential means the request goes out
    /// unauthenticated; it is not an error.
    pub fn authorization(&self) -> Option<HeaderValue> {
        let Some(token) = self.store.load_credential() else {
            debug!("No stored credential; sending unauthenticated");
            return None;
        };
        let header = bearer_header(&token);
        if header.is_none() {
            warn!("Stored credential is not a valid header value; sending unauthenticated");
        }
        header
    }
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplink_core::{AccessToken, MemoryTokenStore};

    #[test]
    fn attaches_stored_credential() {
        let store = Arc::new(MemoryTokenStore::new());
        store.store_tokens(&AccessToken::new("abc"), None).unwrap();
        let auth = RequestAuthenticator::new(store);
        assert_eq!(auth.authorization().unwrap().to_str().unwrap(), "Bearer abc");
    }

    #[test]
    fn no_credential_means_no_header() {
        let auth = RequestAuthenticator::new(Arc::new(MemoryTokenStore::new()));
        assert!(auth.authorization().is_none());
    }

    #[test]
    fn unusable_credential_is_skipped() {
        let store = Arc::new(MemoryTokenStore::new());
        store
            .store_tokens(&AccessToken::new("bad\ntoken"), None)
            .unwrap();
        assert!(RequestAuthenticator::new(store).authorization().is_none());
    }

    #[test]
    fn picks_up_replaced_credential() {
        let store = Arc::new(MemoryTokenStore::new());
        let auth = RequestAuthenticator::new(store.clone());
        store.store_tokens(&AccessToken::new("one"), None).unwrap();
        assert_eq!(auth.authorization().unwrap().to_str().unwrap(), "Bearer one");
        store.store_tokens(&AccessToken::new("two"), None).unwrap();
        assert_eq!(auth.authorization().unwrap().to_str().unwrap(), "Bearer two");
    }
}
