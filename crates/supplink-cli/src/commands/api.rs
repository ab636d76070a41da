//! Raw authenticated API calls.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use supplink_http::ApiRequest;

use crate::commands::reported;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ApiCommand {
    #[command(subcommand)]
    pub command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ApiSubcommand {
    /// GET a path
    Get(PathArgs),

    /// POST a JSON body to a path
    Post(BodyArgs),

    /// PUT a JSON body to a path
    Put(BodyArgs),

    /// PATCH a path with a JSON body
    Patch(BodyArgs),

    /// DELETE a path
    Delete(PathArgs),
}

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Path relative to the API base, e.g. /products
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q', value_parser = parse_pair)]
    pub query: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct BodyArgs {
    #[command(flatten)]
    pub target: PathArgs,

    /// JSON request body
    #[arg(long, default_value = "{}")]
    pub data: String,
}

fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn with_body(request: ApiRequest, args: &BodyArgs) -> Result<ApiRequest> {
    let body: Value = serde_json::from_str(&args.data).context("Invalid JSON in --data")?;
    request.json(&body).map_err(reported)
}

pub async fn handle(cmd: ApiCommand, api: &str) -> Result<()> {
    let request = match &cmd.command {
        ApiSubcommand::Get(args) => ApiRequest::get(&args.path).query(args.query.clone()),
        ApiSubcommand::Delete(args) => ApiRequest::delete(&args.path).query(args.query.clone()),
        ApiSubcommand::Post(args) => with_body(
            ApiRequest::post(&args.target.path).query(args.target.query.clone()),
            args,
        )?,
        ApiSubcommand::Put(args) => with_body(
            ApiRequest::put(&args.target.path).query(args.target.query.clone()),
            args,
        )?,
        ApiSubcommand::Patch(args) => with_body(
            ApiRequest::patch(&args.target.path).query(args.target.query.clone()),
            args,
        )?,
    };

    let manager = session::open(api)?;
    let description = format!("{} {}", request.method(), request.path());
    let response: Value = manager
        .client()
        .execute(request)
        .await
        .map_err(reported)
        .with_context(|| format!("{description} failed"))?;

    output::json_pretty(&response)
}
