//! The authenticated request pipeline.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{Instrument, debug, info_span, warn};

use supplink_core::error::{AuthError, TransportError};
use supplink_core::{Error, Result};

use crate::authenticator::RequestAuthenticator;
use crate::client::ApiClient;
use crate::request::{ApiRequest, OutboundRequest};
use crate::unauthenticated::{RequestState, UnauthenticatedHandler};

/// Client for endpoints that require a signed-in user.
///
/// Attaches the stored credential, refreshes once on a 401, and gives up
/// when the owning session manager is torn down.
#[derive(Clone)]
pub struct AuthedClient {
    client: ApiClient,
    authenticator: RequestAuthenticator,
    handler: Arc<UnauthenticatedHandler>,
    shutdown: watch::Receiver<bool>,
}

impl AuthedClient {
    pub(crate) fn new(
        client: ApiClient,
        authenticator: RequestAuthenticator,
        handler: Arc<UnauthenticatedHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            authenticator,
            handler,
            shutdown,
        }
    }

    /// Send a request and decode its JSON response.
    pub async fn execute<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        if *self.shutdown.borrow() {
            return Err(TransportError::Cancelled.into());
        }

        let path = request.path().to_string();
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            biased;
            _ = cancelled(&mut shutdown) => {
                debug!(path = %path, "Request abandoned on teardown");
                Err(TransportError::Cancelled.into())
            }
            result = self.run(OutboundRequest::new(request)) => result,
        }
    }

    async fn run<R: DeserializeOwned>(&self, mut outbound: OutboundRequest) -> Result<R> {
        loop {
            let span = info_span!(
                "api_request",
                request_id = %uuid::Uuid::new_v4(),
                method = %outbound.request.method(),
                path = outbound.request.path(),
                retried = outbound.retried,
            );

            let response = self
                .client
                .send(&outbound.request, self.authenticator.authorization())
                .instrument(span.clone())
                .await?;
            let status = response.status();

            match self.handler.observe(&mut outbound, status) {
                RequestState::Done => return ApiClient::decode(response).await,
                RequestState::Refreshing => {
                    self.handler.recover().instrument(span).await?;
                }
                _ if status == StatusCode::UNAUTHORIZED => {
                    span.in_scope(|| warn!("Credential rejected after refresh"));
                    return Err(AuthError::Rejected.into());
                }
                _ => {
                    return Err(Error::Server(
                        ApiClient::parse_error_response(response).await,
                    ));
                }
            }
        }
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        self.execute(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        self.execute(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.execute(ApiRequest::delete(path)).await
    }
}

/// Resolves once the shutdown flag is raised. Never resolves if the
/// manager went away without raising it.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl std::fmt::Debug for AuthedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthedClient")
            .field("api", self.client.api())
            .finish_non_exhaustive()
    }
}
