//! Error types for the supplink client.
//!
//! Every remote-call failure is mapped onto this closed taxonomy at the
//! service boundary. UI-level callers that want a flat shape use
//! [`Error::report`] to get an [`ErrorReport`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Message used when a request was sent but no response came back.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Message used when the server failed without explaining why.
pub const SERVER_ERROR_MESSAGE: &str = "Server error occurred";

/// The unified error type for supplink operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local form validation failed. Never produced by a network call.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request was made but no response was received.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The credential was rejected and could not be recovered.
    #[error("authentication rejected: {0}")]
    AuthRejected(#[from] AuthError),

    /// Any other non-success response from the API.
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    /// The local session store could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Local form validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left empty.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// The email address is not plausibly an email address.
    #[error("invalid email address '{value}'")]
    InvalidEmail { value: String },

    /// The password is shorter than the API accepts.
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    /// The role is not one of consumer, supplier or admin.
    #[error("unknown role '{value}'")]
    InvalidRole { value: String },

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The API base URL is unusable.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The request was abandoned because the session manager was torn down.
    #[error("request abandoned")]
    Cancelled,

    /// The request body could not be encoded.
    #[error("could not encode request body: {message}")]
    Encode { message: String },

    /// The response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The API rejected the credential (HTTP 401).
    #[error("credential rejected")]
    Rejected,

    /// No refresh credential is stored.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The refresh call failed; the session has been cleared.
    #[error("session expired: {reason}")]
    RefreshFailed { reason: String },

    /// Login or registration was refused.
    #[error("invalid credentials: {message}")]
    InvalidCredentials {
        message: String,
        /// The response body, if it was JSON.
        data: Option<serde_json::Value>,
    },
}

/// A non-success response other than an authentication failure.
#[derive(Debug)]
pub struct ServerError {
    /// HTTP status code.
    pub status: u16,
    /// Message from the response body, if any.
    pub message: Option<String>,
    /// The response body, if it was JSON.
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServerError {}

impl ServerError {
    /// Build a server error from a status and an optional JSON body.
    ///
    /// The message is taken from the body's `message` field, falling back to
    /// `detail` (string form) which FastAPI-style backends use.
    pub fn new(status: u16, data: Option<serde_json::Value>) -> Self {
        let message = data.as_ref().and_then(|body| {
            body.get("message")
                .and_then(|m| m.as_str())
                .or_else(|| body.get("detail").and_then(|d| d.as_str()))
                .map(str::to_string)
        });
        Self {
            status,
            message,
            data,
        }
    }

    /// Check if this is an authentication failure.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Local persistence failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// A value could not be serialized.
    #[error("could not serialize {key}: {message}")]
    Serialize { key: String, message: String },
}

/// The normalized error shape handed to UI-level callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Human-readable message.
    pub message: String,
    /// HTTP status; 0 for network failures, -1 for local failures.
    pub status: i32,
    /// Response body, when the server sent one.
    pub data: Option<serde_json::Value>,
}

impl Error {
    /// Flatten this error into the `{ message, status, data }` shape.
    pub fn report(&self) -> ErrorReport {
        match self {
            Error::Network(_) => ErrorReport {
                message: NETWORK_ERROR_MESSAGE.to_string(),
                status: 0,
                data: None,
            },
            Error::AuthRejected(err) => ErrorReport {
                message: err.to_string(),
                status: 401,
                data: match err {
                    AuthError::InvalidCredentials { data, .. } => data.clone(),
                    _ => None,
                },
            },
            Error::Server(err) => ErrorReport {
                message: err
                    .message
                    .clone()
                    .unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string()),
                status: i32::from(err.status),
                data: err.data.clone(),
            },
            Error::Validation(err) => ErrorReport {
                message: err.to_string(),
                status: -1,
                data: None,
            },
            Error::Storage(err) => ErrorReport {
                message: err.to_string(),
                status: -1,
                data: None,
            },
        }
    }

    /// Check if this error is an authentication rejection.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Error::AuthRejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_error_prefers_message_field() {
        let err = ServerError::new(400, Some(json!({"message": "bad", "detail": "ignored"})));
        assert_eq!(err.message.as_deref(), Some("bad"));
    }

    #[test]
    fn server_error_falls_back_to_detail() {
        let err = ServerError::new(400, Some(json!({"detail": "Email already registered"})));
        assert_eq!(err.message.as_deref(), Some("Email already registered"));
        assert_eq!(err.to_string(), "HTTP 400: Email already registered");
    }

    #[test]
    fn report_uses_generic_message_without_body() {
        let report = Error::Server(ServerError::new(503, None)).report();
        assert_eq!(report.message, SERVER_ERROR_MESSAGE);
        assert_eq!(report.status, 503);
        assert!(report.data.is_none());
    }

    #[test]
    fn report_for_network_error() {
        let report = Error::Network(TransportError::Timeout).report();
        assert_eq!(report.message, NETWORK_ERROR_MESSAGE);
        assert_eq!(report.status, 0);
    }

    #[test]
    fn report_for_validation_error() {
        let report = Error::Validation(ValidationError::PasswordMismatch).report();
        assert_eq!(report.status, -1);
        assert_eq!(report.message, "passwords do not match");
    }

    #[test]
    fn report_for_refused_login_keeps_body() {
        let body = json!({"detail": "Incorrect email or password"});
        let report = Error::AuthRejected(AuthError::InvalidCredentials {
            message: "Incorrect email or password".to_string(),
            data: Some(body.clone()),
        })
        .report();
        assert_eq!(report.status, 401);
        assert_eq!(report.message, "invalid credentials: Incorrect email or password");
        assert_eq!(report.data, Some(body));

        let report = Error::AuthRejected(AuthError::Rejected).report();
        assert!(report.data.is_none());
    }
}
