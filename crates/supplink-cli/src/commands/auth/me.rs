//! Me command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::reported;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct MeArgs {
    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: MeArgs, api: &str) -> Result<()> {
    let manager = session::open(api)?;
    let profile = manager
        .fetch_current_user()
        .await
        .map_err(reported)
        .context("Failed to fetch current user")?;

    if args.json {
        output::json_pretty(&profile)?;
    } else {
        output::profile(&profile);
    }

    Ok(())
}
