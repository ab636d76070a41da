//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::commands::reported;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, api: &str) -> Result<()> {
    let manager = session::open(api)?;

    eprintln!("{}", "Refreshing session...".dimmed());

    manager
        .refresh()
        .await
        .map_err(reported)
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");

    Ok(())
}
