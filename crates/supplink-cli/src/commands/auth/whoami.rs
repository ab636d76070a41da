//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(_args: WhoamiArgs, api: &str) -> Result<()> {
    let manager = session::open(api)?;
    let profile = manager
        .current_user()
        .context("No active session. Run 'supplink auth login' first.")?;

    output::profile(&profile);
    output::field("API", manager.api().as_str());

    Ok(())
}
