//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::commands::reported;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Use the OAuth2 password form endpoint instead of JSON login
    #[arg(long)]
    pub form: bool,
}

pub async fn run(args: LoginArgs, api: &str) -> Result<()> {
    let manager = session::open(api)?;

    eprintln!("{}", "Logging in...".dimmed());

    let session = if args.form {
        manager.login_form(&args.email, &args.password).await
    } else {
        manager.login(&args.email, &args.password).await
    }
    .map_err(reported)
    .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::profile(&session.profile);
    output::field("API", manager.api().as_str());

    Ok(())
}
