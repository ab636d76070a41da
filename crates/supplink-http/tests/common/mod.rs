#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use wiremock::MockServer;

use supplink_core::{ApiUrl, LoginRedirect, MemoryTokenStore, TokenStore};
use supplink_http::{AuthSessionManager, ClientConfig};

/// Seconds since the epoch, for building tokens relative to now.
pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// An unsigned JWT whose payload carries the given `exp`.
pub fn jwt(sub: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({"sub": sub, "exp": exp}).to_string());
    format!("{header}.{payload}.signature")
}

/// A JWT valid for the next hour.
pub fn fresh_jwt(sub: &str) -> String {
    jwt(sub, now() + 3600)
}

/// API URL pointing at the mock server.
pub fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}/api", server.address().port())).unwrap()
}

/// API URL on a local port with no listener.
pub fn unreachable_api_url() -> ApiUrl {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    ApiUrl::new(format!("http://127.0.0.1:{port}/api")).unwrap()
}

/// Counts login redirects.
#[derive(Debug, Default)]
pub struct CountingRedirect(AtomicUsize);

impl CountingRedirect {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub manager: AuthSessionManager,
    pub store: Arc<dyn TokenStore>,
    pub redirect: Arc<CountingRedirect>,
}

/// A manager over an in-memory store, talking to `api`.
pub fn harness_for(api: ApiUrl) -> Harness {
    harness_with_store(api, Arc::new(MemoryTokenStore::new()))
}

pub fn harness(server: &MockServer) -> Harness {
    harness_for(mock_api_url(server))
}

pub fn harness_with_store(api: ApiUrl, store: Arc<dyn TokenStore>) -> Harness {
    let redirect = Arc::new(CountingRedirect::default());
    let manager =
        AuthSessionManager::new(ClientConfig::new(api), store.clone(), redirect.clone()).unwrap();
    manager.init();
    Harness {
        manager,
        store,
        redirect,
    }
}
