//! Host application hook for unrecoverable authentication failures.

use tracing::warn;

/// Transfers control to the host application's login entry point.
///
/// Called after the session has been cleared because the API rejected the
/// credential and no refresh was possible.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// A redirect that only logs. Useful for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        warn!("Session cleared; login required");
    }
}
