//! Auth endpoint paths and request/response bodies.
//!
//! Token-bearing types do not derive `Debug`.

use serde::{Deserialize, Serialize};

use supplink_core::{Role, UserProfile};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// JSON login.
pub const LOGIN: &str = "/auth/login";

/// OAuth2 password-form login.
pub const TOKEN: &str = "/token";

/// Account registration.
pub const REGISTER: &str = "/auth/register";

/// Refresh-token exchange.
pub const REFRESH: &str = "/auth/refresh";

/// Server-side session revocation.
pub const LOGOUT: &str = "/auth/logout";

/// The signed-in user's profile.
pub const CURRENT_USER: &str = "/auth/me";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for JSON login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for registration.
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

/// Request body for the refresh endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Request body for logout.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<&'a str>,
}

/// Response from login and registration.
///
/// Accepts both the snake_case and camelCase spellings the API has used.
#[derive(Deserialize)]
pub struct AuthResponse {
    #[serde(default, alias = "accessToken")]
    pub access_token: Option<String>,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Response from the refresh endpoint.
#[derive(Deserialize)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken", alias = "access_token")]
    pub access_token: String,
    #[serde(default, rename = "refreshToken", alias = "refresh_token")]
    pub refresh_token: Option<String>,
}
