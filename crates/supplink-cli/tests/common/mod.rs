#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Run the CLI binary with arguments.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_supplink"));
    cmd.args(args);
    cmd.env_remove("SUPPLINK_API_URL");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with a custom HOME directory for isolated session storage.
pub fn run_cli_with_env(args: &[&str], home: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_supplink"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("SUPPLINK_API_URL", api_url);
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with a custom HOME and expect success.
pub fn run_cli_with_env_success(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run_cli_with_env(args, home, api_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with a custom HOME and expect failure; returns stderr.
pub fn run_cli_with_env_failure(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run_cli_with_env(args, home, api_url);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// An unsigned JWT expiring an hour from now.
pub fn fresh_jwt() -> String {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"1","exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

/// Write a stored session for an API origin straight into the data directory
/// used by [`run_cli_with_env`].
///
/// The layout matches the XDG data directory, so this is Linux only.
pub fn seed_session(home: &Path, scope: &str, access_token: &str, refresh_token: &str) {
    let dir = home.join("data").join("supplink").join("scopes");
    std::fs::create_dir_all(&dir).unwrap();
    let user = serde_json::json!({
        "id": 9,
        "name": "Acme Supply",
        "email": "ops@acme.test",
        "role": "supplier"
    });
    let scope_file = serde_json::json!({
        "accessToken": access_token,
        "refreshToken": refresh_token,
        "user": user.to_string()
    });
    std::fs::write(dir.join(format!("{scope}.json")), scope_file.to_string()).unwrap();
}
