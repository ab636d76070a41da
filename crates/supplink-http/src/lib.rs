//! supplink-http - HTTP transport and session lifecycle.
//!
//! [`AuthSessionManager`] is the entry point: it signs users in and out,
//! persists the session through a [`TokenStore`](supplink_core::TokenStore),
//! and hands out an [`AuthedClient`] that attaches the stored credential and
//! refreshes it once when the API rejects it.

mod authed;
mod authenticator;
mod client;
mod config;
mod manager;
mod request;
mod unauthenticated;

pub use authed::AuthedClient;
pub use authenticator::RequestAuthenticator;
pub use client::{ApiClient, bearer_header, endpoints};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use manager::{AuthSessionManager, MIN_PASSWORD_LEN, RegisterFields};
pub use request::{ApiRequest, Body, OutboundRequest};
pub use unauthenticated::{RequestState, UnauthenticatedHandler};
