//! Recovery from rejected credentials.
//!
//! Every authenticated request walks the same small state machine:
//!
//! ```text
//! Sent -> Done                      (2xx)
//! Sent -> Refreshing                (401, not yet retried)
//! Refreshing -> Sent                (refresh ok; request re-issued once)
//! Refreshing -> SessionCleared      (refresh failed or impossible)
//! Sent -> Fail                      (anything else, or 401 after a retry)
//! ```
//!
//! The `retried` flag on [`OutboundRequest`] is set on the way into
//! `Refreshing`, so a request can refresh at most once.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};

use supplink_core::error::AuthError;
use supplink_core::{AccessToken, Error, LoginRedirect, RefreshToken, Result, TokenStore};

use crate::client::ApiClient;
use crate::client::endpoints::{self, RefreshRequest, RefreshResponse};
use crate::request::{ApiRequest, OutboundRequest};

/// Where a single authenticated request stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// The request is (about to be) on the wire.
    Sent,
    /// The credential was rejected; a refresh is due.
    Refreshing,
    /// The request succeeded.
    Done,
    /// The request failed and will not be retried.
    Fail,
    /// Refresh failed; the session is gone.
    SessionCleared,
}

impl RequestState {
    /// The state after a response arrives.
    pub fn after_response(status: StatusCode, retried: bool) -> Self {
        if status.is_success() {
            RequestState::Done
        } else if status == StatusCode::UNAUTHORIZED && !retried {
            RequestState::Refreshing
        } else {
            RequestState::Fail
        }
    }

    /// The state after a refresh attempt.
    pub fn after_refresh(ok: bool) -> Self {
        if ok {
            RequestState::Sent
        } else {
            RequestState::SessionCleared
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Done | RequestState::Fail | RequestState::SessionCleared
        )
    }
}

/// Reacts to 401 responses on authenticated requests.
pub struct UnauthenticatedHandler {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
}

impl UnauthenticatedHandler {
    pub fn new(
        client: ApiClient,
        store: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            client,
            store,
            redirect,
        }
    }

    /// Classify a response for `outbound`, marking it retried when a
    /// refresh is about to happen.
    pub fn observe(&self, outbound: &mut OutboundRequest, status: StatusCode) -> RequestState {
        let state = RequestState::after_response(status, outbound.retried);
        if state == RequestState::Refreshing {
            outbound.retried = true;
        }
        state
    }

    /// Try to get a fresh credential after a rejection.
    ///
    /// On failure the store is cleared and the login redirect fires once.
    #[instrument(skip(self))]
    pub async fn recover(&self) -> Result<()> {
        match self.refresh().await {
            Ok(_) => {
                debug!(state = ?RequestState::after_refresh(true), "Credential refreshed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, state = ?RequestState::after_refresh(false), "Refresh failed; clearing session");
                self.store.clear();
                self.redirect.redirect_to_login();
                Err(AuthError::RefreshFailed {
                    reason: err.to_string(),
                }
                .into())
            }
        }
    }

    /// Exchange the stored refresh token for a new access token and store it.
    ///
    /// Does not clear anything on failure; callers decide.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        let refresh_token = self
            .store
            .load_refresh_token()
            .ok_or(Error::AuthRejected(AuthError::NoRefreshToken))?;

        info!("Refreshing access token");
        let request = ApiRequest::post(endpoints::REFRESH).json(&RefreshRequest {
            refresh_token: refresh_token.as_str(),
        })?;
        let response: RefreshResponse = self.client.execute(&request).await?;

        let access = AccessToken::new(response.access_token);
        let rotated = response.refresh_token.map(RefreshToken::new);
        self.store.store_tokens(&access, rotated.as_ref())?;

        debug!(rotated = rotated.is_some(), "Access token stored");
        Ok(access)
    }
}

impl std::fmt::Debug for UnauthenticatedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnauthenticatedHandler")
            .field("api", self.client.api())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_done() {
        assert_eq!(
            RequestState::after_response(StatusCode::OK, false),
            RequestState::Done
        );
        assert_eq!(
            RequestState::after_response(StatusCode::NO_CONTENT, true),
            RequestState::Done
        );
    }

    #[test]
    fn first_401_refreshes() {
        assert_eq!(
            RequestState::after_response(StatusCode::UNAUTHORIZED, false),
            RequestState::Refreshing
        );
    }

    #[test]
    fn second_401_fails() {
        assert_eq!(
            RequestState::after_response(StatusCode::UNAUTHORIZED, true),
            RequestState::Fail
        );
    }

    #[test]
    fn other_errors_fail_without_refresh() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            assert_eq!(
                RequestState::after_response(status, false),
                RequestState::Fail
            );
        }
    }

    #[test]
    fn refresh_outcomes() {
        assert_eq!(RequestState::after_refresh(true), RequestState::Sent);
        assert_eq!(
            RequestState::after_refresh(false),
            RequestState::SessionCleared
        );
        assert!(RequestState::SessionCleared.is_terminal());
        assert!(!RequestState::Refreshing.is_terminal());
    }

    #[test]
    fn observe_marks_retried_once() {
        use supplink_core::{LogRedirect, MemoryTokenStore};

        let api = supplink_core::ApiUrl::new("http://localhost:5000/api").unwrap();
        let client = ApiClient::new(&crate::ClientConfig::new(api)).unwrap();
        let handler = UnauthenticatedHandler::new(
            client,
            Arc::new(MemoryTokenStore::new()),
            Arc::new(LogRedirect),
        );

        let mut outbound = OutboundRequest::new(ApiRequest::get("/orders"));
        assert_eq!(
            handler.observe(&mut outbound, StatusCode::UNAUTHORIZED),
            RequestState::Refreshing
        );
        assert!(outbound.retried);
        assert_eq!(
            handler.observe(&mut outbound, StatusCode::UNAUTHORIZED),
            RequestState::Fail
        );
    }
}
