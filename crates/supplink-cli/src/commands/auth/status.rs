//! Status command implementation.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use supplink_core::clock::expires_at;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub fn run(_args: StatusArgs, api: &str) -> Result<()> {
    let manager = session::open(api)?;
    let store = manager.store();

    let Some(token) = store.load_credential() else {
        output::field("Authenticated", "no");
        return Ok(());
    };

    let authenticated = manager.is_authenticated();
    output::field("Authenticated", if authenticated { "yes" } else { "no" });

    match expires_at(&token).and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)) {
        Some(at) => output::field("Expires", &at.to_rfc3339()),
        None => output::warning("Stored credential carries no readable expiry"),
    }
    if let Some(remaining) = manager.clock().seconds_remaining(&token) {
        output::field("Remaining", &format!("{}s", remaining.max(0)));
    }
    output::field(
        "Refresh token",
        if store.load_refresh_token().is_some() { "stored" } else { "none" },
    );

    Ok(())
}
