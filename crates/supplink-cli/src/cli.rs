//! CLI argument definitions.

use clap::{Parser, Subcommand};

use supplink_http::DEFAULT_API_URL;

use crate::commands::api::ApiCommand;
use crate::commands::auth::AuthCommand;

/// Command-line client for the supplink marketplace API.
#[derive(Parser, Debug)]
#[command(name = "supplink")]
#[command(author, version = env!("SUPPLINK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "SUPPLINK_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and inspect the session
    Auth(AuthCommand),

    /// Make an authenticated API call
    Api(ApiCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_api_after_subcommand() {
        let cli = Cli::try_parse_from([
            "supplink",
            "auth",
            "whoami",
            "--api",
            "http://127.0.0.1:9000/api",
        ])
        .unwrap();
        assert_eq!(cli.api, "http://127.0.0.1:9000/api");
    }
}
