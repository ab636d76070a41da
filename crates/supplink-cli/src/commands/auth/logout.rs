//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, api: &str) -> Result<()> {
    let manager = session::open(api)?;
    manager.logout().await;
    output::success("Logged out");
    Ok(())
}
