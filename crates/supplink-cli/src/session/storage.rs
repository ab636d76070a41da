//! Where sessions live on disk.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use supplink_core::ApiUrl;
use supplink_store::FileTokenStore;

/// Directory holding one scope file per API origin.
pub fn scopes_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "supplink").context("Could not determine data directory")?;

    let dir = dirs.data_dir().join("scopes");
    fs::create_dir_all(&dir).context("Failed to create data directory")?;

    Ok(dir)
}

/// The session store for an API origin.
pub fn open_store(api: &ApiUrl) -> Result<FileTokenStore> {
    Ok(FileTokenStore::for_api(scopes_dir()?, api))
}
