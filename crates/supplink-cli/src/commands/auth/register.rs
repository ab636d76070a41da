//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use supplink_core::Role;
use supplink_http::RegisterFields;

use crate::commands::reported;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password (at least 8 characters)
    #[arg(long)]
    pub password: String,

    /// Repeat the password to guard against typos
    #[arg(long)]
    pub confirm_password: Option<String>,

    /// Full name, or business name for suppliers
    #[arg(long)]
    pub name: String,

    /// Account type: consumer, supplier or admin
    #[arg(long, default_value = "consumer")]
    pub role: Role,
}

pub async fn run(args: RegisterArgs, api: &str) -> Result<()> {
    let manager = session::open(api)?;

    eprintln!("{}", "Creating account...".dimmed());

    let session = manager
        .register(RegisterFields {
            email: args.email,
            password: args.password,
            confirm_password: args.confirm_password,
            full_name: args.name,
            role: args.role,
        })
        .await
        .map_err(reported)
        .context("Failed to register")?;

    output::success("Account created");
    println!();
    output::profile(&session.profile);

    Ok(())
}
