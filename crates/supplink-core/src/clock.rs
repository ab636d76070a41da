//! Credential expiry checks.
//!
//! Access tokens are JWTs. The middle segment is base64url-encoded JSON whose
//! `exp` claim holds the expiry in seconds since the Unix epoch. Nothing here
//! verifies signatures; the API does that. This module only answers whether a
//! credential is worth sending.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::Utc;
use tracing::trace;

use crate::tokens::AccessToken;

/// A source of wall-clock time in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Decides whether a credential is currently valid.
///
/// A credential with expiry `t` is valid iff `now < t`. Expiry exactly equal
/// to now counts as expired.
#[derive(Clone)]
pub struct SessionClock {
    clock: Arc<dyn Clock>,
}

impl SessionClock {
    /// A session clock backed by the system time.
    pub fn system() -> Self {
        Self::with_clock(SystemClock)
    }

    /// A session clock backed by a custom time source.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Current time according to this clock.
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Returns true iff the credential is present, decodable and unexpired.
    ///
    /// Never panics; malformed input yields `false`.
    pub fn is_valid(&self, token: Option<&AccessToken>) -> bool {
        match token.and_then(expires_at) {
            Some(exp) => self.now() < exp,
            None => false,
        }
    }

    /// Seconds until the credential expires; negative once it has.
    pub fn seconds_remaining(&self, token: &AccessToken) -> Option<i64> {
        expires_at(token).map(|exp| exp - self.now())
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for SessionClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClock")
            .field("now", &self.now())
            .finish()
    }
}

/// Reads the `exp` claim of a JWT access token.
///
/// Returns `None` if the token does not have three segments, the payload is
/// not base64 JSON, or `exp` is missing or not a number. Fractional expiries
/// are truncated to whole seconds.
pub fn expires_at(token: &AccessToken) -> Option<i64> {
    let mut segments = token.as_str().split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        trace!("credential has more than three segments");
        return None;
    }

    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    let exp = claims.get("exp")?;
    exp.as_i64().or_else(|| exp.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwt(claims: serde_json::Value) -> AccessToken {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        AccessToken::new(format!("{}.{}.signature", header, payload))
    }

    #[test]
    fn valid_strictly_before_expiry() {
        let token = jwt(json!({"sub": "1", "exp": 1_000}));
        assert!(SessionClock::with_clock(FixedClock(999)).is_valid(Some(&token)));
    }

    #[test]
    fn expired_at_exact_expiry() {
        let token = jwt(json!({"exp": 1_000}));
        assert!(!SessionClock::with_clock(FixedClock(1_000)).is_valid(Some(&token)));
        assert!(!SessionClock::with_clock(FixedClock(1_001)).is_valid(Some(&token)));
    }

    #[test]
    fn absent_token_is_invalid() {
        assert!(!SessionClock::with_clock(FixedClock(0)).is_valid(None));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let clock = SessionClock::with_clock(FixedClock(0));
        for raw in [
            "",
            "not-a-jwt",
            "a.b",
            "a.!!!.c",
            "a.b.c.d",
            format!("x.{}.y", URL_SAFE_NO_PAD.encode("not json")).as_str(),
        ] {
            assert!(!clock.is_valid(Some(&AccessToken::new(raw))), "{raw:?}");
        }
    }

    #[test]
    fn missing_or_non_numeric_exp_is_invalid() {
        let clock = SessionClock::with_clock(FixedClock(0));
        assert!(!clock.is_valid(Some(&jwt(json!({"sub": "1"})))));
        assert!(!clock.is_valid(Some(&jwt(json!({"exp": "tomorrow"})))));
    }

    #[test]
    fn tolerates_padded_payload() {
        let header = URL_SAFE_NO_PAD.encode("{}");
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":50}"#);
        let token = AccessToken::new(format!("{}.{}.sig", header, payload));
        assert_eq!(expires_at(&token), Some(50));
    }

    #[test]
    fn seconds_remaining_counts_down() {
        let token = jwt(json!({"exp": 1_900}));
        let clock = SessionClock::with_clock(FixedClock(1_000));
        assert_eq!(clock.seconds_remaining(&token), Some(900));
    }
}
