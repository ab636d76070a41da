//! HTTP client for the marketplace API.
//!
//! [`ApiClient`] is the public, unauthenticated client. Authenticated traffic
//! goes through [`AuthedClient`](crate::AuthedClient), which wraps it.

pub mod endpoints;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use supplink_core::error::{AuthError, Error, ServerError, TransportError};
use supplink_core::{AccessToken, ApiUrl, Result};

use crate::config::ClientConfig;
use crate::request::ApiRequest;

/// Message used when the API refuses a login without saying why.
const INVALID_CREDENTIALS_MESSAGE: &str = "Incorrect email or password";

/// Map a reqwest failure onto the transport taxonomy.
pub(crate) fn map_transport(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Network(transport)
}

/// Build an `Authorization: Bearer` header value.
///
/// Returns `None` if the token contains bytes that cannot appear in a header.
pub fn bearer_header(token: &AccessToken) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// HTTP client for public API requests.
///
/// Clone is cheap; the underlying `reqwest::Client` shares its pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl ApiClient {
    /// Create a new client for the configured API.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(map_transport)?;

        Ok(Self {
            client,
            api: config.api.clone(),
        })
    }

    /// Returns the API URL this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Make a public request and decode the JSON response.
    ///
    /// A 401 here means the supplied credentials were refused; it is
    /// reported as [`AuthError::InvalidCredentials`].
    #[instrument(skip(self, request), fields(api = %self.api, method = %request.method(), path = request.path()))]
    pub async fn execute<R>(&self, request: &ApiRequest) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!("Public request");
        let response = self.send(request, None).await?;
        let status = response.status();
        if status.is_success() {
            Self::decode(response).await
        } else if status == StatusCode::UNAUTHORIZED {
            let error = Self::parse_error_response(response).await;
            Err(AuthError::InvalidCredentials {
                message: error
                    .message
                    .unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.to_string()),
                data: error.data,
            }
            .into())
        } else {
            Err(Error::Server(Self::parse_error_response(response).await))
        }
    }

    /// Make a request carrying an explicit bearer token, with no refresh
    /// handling. Any non-success status is a [`ServerError`].
    #[instrument(skip(self, request, token), fields(api = %self.api, method = %request.method(), path = request.path()))]
    pub async fn execute_with_token<R>(&self, request: &ApiRequest, token: &AccessToken) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!("Request with explicit credential");
        let response = self.send(request, bearer_header(token)).await?;
        Self::handle_response(response).await
    }

    /// Send a request, optionally with an authorization header.
    pub(crate) async fn send(
        &self,
        request: &ApiRequest,
        authorization: Option<HeaderValue>,
    ) -> Result<reqwest::Response> {
        let url = self.api.endpoint(request.path());
        let mut builder = request.build(&self.client, &url);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = builder.send().await.map_err(map_transport)?;
        trace!(status = %response.status(), "API response");
        Ok(response)
    }

    /// Handle a response, parsing the body or error.
    pub(crate) async fn handle_response<R: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<R> {
        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(Error::Server(Self::parse_error_response(response).await))
        }
    }

    /// Decode a successful response. An empty body decodes as JSON `null`.
    pub(crate) async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let bytes = response.bytes().await.map_err(map_transport)?;
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(bytes).map_err(|e| {
            TransportError::Decode {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Parse an error response into a [`ServerError`].
    pub(crate) async fn parse_error_response(response: reqwest::Response) -> ServerError {
        let status = response.status().as_u16();

        // Try to parse the body as JSON; anything else carries no detail
        match response.json::<serde_json::Value>().await {
            Ok(body) => ServerError::new(status, Some(body)),
            Err(_) => ServerError::new(status, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let api = ApiUrl::new("http://localhost:5000/api").unwrap();
        let client = ApiClient::new(&ClientConfig::new(api.clone())).unwrap();
        assert_eq!(client.api(), &api);
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let value = bearer_header(&AccessToken::new("abc.def.ghi")).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc.def.ghi");
        assert!(value.is_sensitive());
    }

    #[test]
    fn bearer_header_rejects_control_characters() {
        assert!(bearer_header(&AccessToken::new("abc\ndef")).is_none());
    }
}
