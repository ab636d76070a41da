//! Session manager wiring for the CLI.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use supplink_core::{ApiUrl, LoginRedirect};
use supplink_http::{AuthSessionManager, ClientConfig};

/// The CLI cannot navigate anywhere, so a lost session becomes a hint.
#[derive(Debug, Default)]
pub struct CliRedirect;

impl LoginRedirect for CliRedirect {
    fn redirect_to_login(&self) {
        eprintln!(
            "{} {}",
            "Session expired.".yellow(),
            "Run 'supplink auth login' to sign in again.".dimmed()
        );
    }
}

/// Build and initialise the session manager for `api`.
pub fn open(api: &str) -> Result<AuthSessionManager> {
    let api = ApiUrl::new(api).context("Invalid API URL")?;
    let store = storage::open_store(&api)?;
    tracing::debug!(scope = store.scope().name(), "Opening session store");

    let manager = AuthSessionManager::new(
        ClientConfig::new(api),
        Arc::new(store),
        Arc::new(CliRedirect),
    )
    .context("Failed to create API client")?;
    manager.init();
    Ok(manager)
}
