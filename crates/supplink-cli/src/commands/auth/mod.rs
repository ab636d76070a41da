//! Auth subcommand implementations.

mod login;
mod logout;
mod me;
mod refresh;
mod register;
mod status;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in and store the session
    Login(login::LoginArgs),

    /// Create an account and sign in as it
    Register(register::RegisterArgs),

    /// Sign out and forget the stored session
    Logout(logout::LogoutArgs),

    /// Show the cached user profile
    Whoami(whoami::WhoamiArgs),

    /// Show whether the stored credential is still valid
    Status(status::StatusArgs),

    /// Exchange the refresh token for a new access token
    Refresh(refresh::RefreshArgs),

    /// Fetch the current user from the API and update the cache
    Me(me::MeArgs),
}

pub async fn handle(cmd: AuthCommand, api: &str) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(args, api).await,
        AuthSubcommand::Register(args) => register::run(args, api).await,
        AuthSubcommand::Logout(args) => logout::run(args, api).await,
        AuthSubcommand::Whoami(args) => whoami::run(args, api),
        AuthSubcommand::Status(args) => status::run(args, api),
        AuthSubcommand::Refresh(args) => refresh::run(args, api).await,
        AuthSubcommand::Me(args) => me::run(args, api).await,
    }
}
