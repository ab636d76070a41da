//! The process-wide session manager.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use supplink_core::error::{AuthError, ValidationError};
use supplink_core::{
    AccessToken, ApiUrl, LoginRedirect, RefreshToken, Result, Role, Session, SessionClock, TokenStore,
    UserProfile,
};

use crate::authed::AuthedClient;
use crate::authenticator::RequestAuthenticator;
use crate::client::ApiClient;
use crate::client::endpoints::{self, AuthResponse, LoginRequest, LogoutRequest, RegisterRequest};
use crate::config::ClientConfig;
use crate::request::ApiRequest;
use crate::unauthenticated::UnauthenticatedHandler;

/// Shortest password the API accepts at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Fields collected by a registration form.
#[derive(Clone)]
pub struct RegisterFields {
    pub email: String,
    pub password: String,
    /// Repeated password, when the form asks for one.
    pub confirm_password: Option<String>,
    pub full_name: String,
    pub role: Role,
}

impl RegisterFields {
    /// Check the form locally. Nothing is sent if this fails.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "full name" });
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        match &self.confirm_password {
            Some(confirm) if confirm != &self.password => Err(ValidationError::PasswordMismatch),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for RegisterFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterFields")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// A plausible `local@domain.tld` address, no whitespace.
fn validate_email(email: &str) -> std::result::Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail {
        value: email.to_string(),
    };
    if email.is_empty() {
        return Err(ValidationError::MissingField { field: "email" });
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

fn require(field: &'static str, value: &str) -> std::result::Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

/// Owns the session for one API origin.
///
/// Construct one at startup, call [`init`](Self::init), share it, and call
/// [`teardown`](Self::teardown) when the host is done.
pub struct AuthSessionManager {
    client: ApiClient,
    authed: AuthedClient,
    handler: Arc<UnauthenticatedHandler>,
    store: Arc<dyn TokenStore>,
    clock: SessionClock,
    shutdown: watch::Sender<bool>,
}

impl AuthSessionManager {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self> {
        Self::with_clock(config, store, redirect, SessionClock::system())
    }

    pub fn with_clock(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
        clock: SessionClock,
    ) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        let handler = Arc::new(UnauthenticatedHandler::new(
            client.clone(),
            store.clone(),
            redirect,
        ));
        let (shutdown, cancelled) = watch::channel(false);
        let authed = AuthedClient::new(
            client.clone(),
            RequestAuthenticator::new(store.clone()),
            handler.clone(),
            cancelled,
        );

        Ok(Self {
            client,
            authed,
            handler,
            store,
            clock,
            shutdown,
        })
    }

    /// Bootstrap from storage.
    ///
    /// Returns the stored session if there is one and its credential has not
    /// expired. An expired session is left in place; the next request may
    /// still refresh it.
    #[instrument(skip(self), fields(api = %self.client.api()))]
    pub fn init(&self) -> Option<Session> {
        self.shutdown.send_replace(false);
        let Some(session) = self.store.load_session() else {
            debug!("No stored session");
            return None;
        };
        if self.clock.is_valid(Some(&session.access_token)) {
            info!(user_id = session.profile.id, role = %session.role(), "Session restored");
            Some(session)
        } else {
            info!(user_id = session.profile.id, "Stored credential has expired");
            None
        }
    }

    /// Abandon in-flight authenticated requests. They resolve to a
    /// cancelled network error.
    pub fn teardown(&self) {
        debug!("Session manager torn down");
        self.shutdown.send_replace(true);
    }

    /// Sign in with email and password.
    #[instrument(skip(self, password), fields(api = %self.client.api()))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        require("email", email)?;
        require("password", password)?;

        info!("Logging in");
        let request = ApiRequest::post(endpoints::LOGIN).json(&LoginRequest { email, password })?;
        let response: AuthResponse = self.client.execute(&request).await?;
        self.establish(response).await
    }

    /// Sign in through the OAuth2 password form.
    #[instrument(skip(self, password), fields(api = %self.client.api()))]
    pub async fn login_form(&self, username: &str, password: &str) -> Result<Session> {
        require("username", username)?;
        require("password", password)?;

        info!("Logging in with password form");
        let request =
            ApiRequest::post(endpoints::TOKEN).form([("username", username), ("password", password)]);
        let response: AuthResponse = self.client.execute(&request).await?;
        self.establish(response).await
    }

    /// Create an account and sign in as it.
    ///
    /// If the API answers with the new user but no token, a login with the
    /// same credentials follows.
    #[instrument(skip(self, form), fields(api = %self.client.api(), email = %form.email, role = %form.role))]
    pub async fn register(&self, form: RegisterFields) -> Result<Session> {
        form.validate()?;

        info!("Registering account");
        let request = ApiRequest::post(endpoints::REGISTER).json(&RegisterRequest {
            email: &form.email,
            password: &form.password,
            full_name: &form.full_name,
            role: form.role,
        })?;
        let response: AuthResponse = self.client.execute(&request).await?;

        if response.access_token.is_some() {
            self.establish(response).await
        } else {
            debug!("Registration returned no token; logging in");
            self.login(&form.email, &form.password).await
        }
    }

    /// Turn an auth response into a stored session.
    async fn establish(&self, response: AuthResponse) -> Result<Session> {
        let access_token = response
            .access_token
            .map(AccessToken::new)
            .ok_or_else(|| AuthError::InvalidCredentials {
                message: "response carried no access token".to_string(),
                data: None,
            })?;
        let refresh_token = response.refresh_token.map(RefreshToken::new);

        let profile = match response.user {
            Some(profile) => profile,
            None => {
                debug!("Auth response carried no user; fetching profile");
                self.client
                    .execute_with_token(&ApiRequest::get(endpoints::CURRENT_USER), &access_token)
                    .await?
            }
        };

        let session = Session::new(access_token, refresh_token, profile);
        self.store.save(&session)?;
        info!(user_id = session.profile.id, role = %session.role(), "Session established");
        Ok(session)
    }

    /// Sign out. The local session is always cleared, whatever the server
    /// says.
    #[instrument(skip(self), fields(api = %self.client.api()))]
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.store.load_refresh_token() {
            if let Err(err) = self.revoke(&refresh_token).await {
                warn!(error = %err, "Server-side logout failed");
            }
        }
        self.store.clear();
        info!("Logged out");
    }

    /// Ask the API to revoke a refresh token.
    ///
    /// Sent once with the stored credential. A 401 is not recovered through
    /// a refresh, which would rotate the token being revoked.
    async fn revoke(&self, refresh_token: &RefreshToken) -> Result<()> {
        let request = ApiRequest::post(endpoints::LOGOUT).json(&LogoutRequest {
            refresh_token: Some(refresh_token.as_str()),
        })?;
        let _: serde_json::Value = match self.store.load_credential() {
            Some(token) => self.client.execute_with_token(&request, &token).await?,
            None => self.client.execute(&request).await?,
        };
        Ok(())
    }

    /// Exchange the refresh token for a new access token now.
    ///
    /// On failure the stored tokens are cleared. No redirect is signalled;
    /// the caller asked for this and gets the error.
    #[instrument(skip(self), fields(api = %self.client.api()))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        match self.handler.refresh().await {
            Ok(token) => Ok(token),
            Err(err) => {
                warn!(error = %err, "Refresh failed; clearing session");
                self.store.clear();
                Err(err)
            }
        }
    }

    /// Fetch the signed-in user and update the cached profile.
    #[instrument(skip(self), fields(api = %self.client.api()))]
    pub async fn fetch_current_user(&self) -> Result<UserProfile> {
        let profile: UserProfile = self.authed.get(endpoints::CURRENT_USER).await?;
        self.store.store_profile(&profile)?;
        Ok(profile)
    }

    /// A profile is cached and the stored credential has not expired.
    pub fn is_authenticated(&self) -> bool {
        self.store.load_profile().is_some()
            && self.clock.is_valid(self.store.load_credential().as_ref())
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.store.load_profile()
    }

    pub fn user_type(&self) -> Option<Role> {
        self.store.load_profile().map(|p| p.role)
    }

    pub fn api(&self) -> &ApiUrl {
        self.client.api()
    }

    /// Client for arbitrary authenticated calls.
    pub fn client(&self) -> &AuthedClient {
        &self.authed
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }
}

impl std::fmt::Debug for AuthSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionManager")
            .field("api", self.client.api())
            .field("torn_down", &*self.shutdown.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> RegisterFields {
        RegisterFields {
            email: "buyer@example.com".to_string(),
            password: "correct horse".to_string(),
            confirm_password: Some("correct horse".to_string()),
            full_name: "Pat Buyer".to_string(),
            role: Role::Consumer,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert_eq!(fields().validate(), Ok(()));

        let mut no_confirm = fields();
        no_confirm.confirm_password = None;
        assert_eq!(no_confirm.validate(), Ok(()));
    }

    #[test]
    fn short_password_rejected() {
        let mut f = fields();
        f.password = "short".to_string();
        f.confirm_password = Some("short".to_string());
        assert_eq!(
            f.validate(),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );
    }

    #[test]
    fn mismatched_confirmation_rejected() {
        let mut f = fields();
        f.confirm_password = Some("correct horses".to_string());
        assert_eq!(f.validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@shop.example.com").is_ok());
        for bad in ["plain", "@b.co", "a@", "a@b", "a@.co", "a@b.", "a b@c.co", "a@b@c.co"] {
            assert!(
                matches!(validate_email(bad), Err(ValidationError::InvalidEmail { .. })),
                "{bad} should be rejected"
            );
        }
        assert_eq!(
            validate_email(""),
            Err(ValidationError::MissingField { field: "email" })
        );
    }

    #[test]
    fn debug_hides_passwords() {
        let debug = format!("{:?}", fields());
        assert!(debug.contains("buyer@example.com"));
        assert!(!debug.contains("correct horse"));
    }
}
