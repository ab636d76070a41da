//! A durable key/value scope backed by one JSON file.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use supplink_core::error::{Error, StorageError};
use supplink_core::{ApiUrl, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn map_io(path: &Path, err: std::io::Error) -> Error {
    Error::Storage(StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// String values under string keys, persisted across process restarts.
///
/// Each scope is a single `<name>.json` file under a root directory. Writes
/// are serialized by an exclusive lock on `<name>.lock` and land through a
/// temp file and rename, so readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct KeyValueScope {
    root: PathBuf,
    name: String,
}

impl KeyValueScope {
    /// Create a scope with an explicit name under the given root directory.
    pub fn new(root: impl AsRef<Path>, name: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            name: name.into(),
        }
    }

    /// Create the scope that belongs to an API origin.
    pub fn for_api(root: impl AsRef<Path>, api: &ApiUrl) -> Self {
        Self::new(root, api.scope_name())
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the scope name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the path of the data file.
    pub fn path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.name))
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join(format!("{}.lock", self.name))
    }

    /// Read a single value. Missing and unreadable files both read as empty.
    pub fn get(&self, key: &str) -> Option<String> {
        self.read_map().remove(key)
    }

    /// Set a single value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(&[(key, Some(value.to_string()))])
    }

    /// Remove a single value.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.update(&[(key, None)])
    }

    /// Apply several changes in one write. `None` removes the key.
    #[instrument(skip(self, changes), fields(scope = %self.name))]
    pub fn update(&self, changes: &[(&str, Option<String>)]) -> Result<()> {
        let lock_file = self.lock()?;
        let result = self.update_locked(changes);

        if let Err(e) = FileExt::unlock(&lock_file) {
            warn!(error = %e, "Failed to release scope lock");
        }

        result
    }

    fn update_locked(&self, changes: &[(&str, Option<String>)]) -> Result<()> {
        let mut map = self.read_map();
        for (key, value) in changes {
            match value {
                Some(value) => {
                    map.insert((*key).to_string(), value.clone());
                }
                None => {
                    map.remove(*key);
                }
            }
        }

        if map.is_empty() {
            return self.remove_file();
        }

        let content = serde_json::to_string_pretty(&map).map_err(|e| {
            Error::Storage(StorageError::Serialize {
                key: self.name.clone(),
                message: e.to_string(),
            })
        })?;

        let path = self.path();
        let tmp_path = self
            .root
            .join(format!(".{}.{}.tmp", self.name, Uuid::new_v4().simple()));

        let write_tmp = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&tmp_path)?;

            // Set restrictive permissions (Unix only)
            #[cfg(unix)]
            {
                let mut perms = file.metadata()?.permissions();
                perms.set_mode(0o600);
                file.set_permissions(perms)?;
            }

            file.write_all(content.as_bytes())?;
            file.sync_data()?;
            Ok(())
        };

        if let Err(e) = write_tmp().and_then(|_| fs::rename(&tmp_path, &path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(map_io(&path, e));
        }

        debug!(keys = map.len(), "Scope written");
        Ok(())
    }

    /// Remove every value. Never fails; problems are logged.
    ///
    /// Waits for the scope lock so an in-flight [`update`](Self::update)
    /// cannot write the old values back afterwards. If the lock cannot be
    /// taken the file is removed anyway.
    pub fn clear(&self) {
        let lock_file = match self.lock() {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(scope = %self.name, error = %e, "Clearing scope without lock");
                None
            }
        };

        if let Err(e) = self.remove_file() {
            warn!(scope = %self.name, error = %e, "Failed to clear scope");
        }

        if let Some(lock_file) = lock_file {
            if let Err(e) = FileExt::unlock(&lock_file) {
                warn!(error = %e, "Failed to release scope lock");
            }
        }
    }

    /// Open the lock file and hold it exclusively.
    fn lock(&self) -> Result<fs::File> {
        fs::create_dir_all(&self.root).map_err(|e| map_io(&self.root, e))?;

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| map_io(&lock_path, e))?;

        lock_file
            .lock_exclusive()
            .map_err(|e| map_io(&lock_path, e))?;
        Ok(lock_file)
    }

    fn remove_file(&self) -> Result<()> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(scope = %self.name, "Scope cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(&path, e)),
        }
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read scope");
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt scope file");
            BTreeMap::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_get_remove() {
        let dir = TempDir::new().unwrap();
        let scope = KeyValueScope::new(dir.path(), "test");

        assert_eq!(scope.get("a"), None);
        scope.set("a", "1").unwrap();
        scope.set("b", "2").unwrap();
        assert_eq!(scope.get("a").as_deref(), Some("1"));

        scope.remove("a").unwrap();
        assert_eq!(scope.get("a"), None);
        assert_eq!(scope.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn removing_last_key_deletes_file() {
        let dir = TempDir::new().unwrap();
        let scope = KeyValueScope::new(dir.path(), "test");
        scope.set("a", "1").unwrap();
        assert!(scope.path().exists());
        scope.remove("a").unwrap();
        assert!(!scope.path().exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let scope = KeyValueScope::new(dir.path(), "test");
        scope.clear();
        scope.set("a", "1").unwrap();
        scope.clear();
        scope.clear();
        assert_eq!(scope.get("a"), None);
    }

    #[test]
    fn clear_waits_for_writer_lock() {
        let dir = TempDir::new().unwrap();
        let scope = KeyValueScope::new(dir.path(), "test");
        scope.set("a", "1").unwrap();

        let held = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(scope.lock_path())
            .unwrap();
        held.lock_exclusive().unwrap();

        let clearing = {
            let scope = scope.clone();
            std::thread::spawn(move || scope.clear())
        };

        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(!clearing.is_finished());
        assert!(scope.path().exists());

        FileExt::unlock(&held).unwrap();
        clearing.join().unwrap();
        assert!(!scope.path().exists());
        assert_eq!(scope.get("a"), None);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let scope = KeyValueScope::new(dir.path(), "test");
        fs::write(scope.path(), "{not json").unwrap();
        assert_eq!(scope.get("a"), None);

        // A write replaces the corrupt content
        scope.set("a", "1").unwrap();
        assert_eq!(scope.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn scopes_are_isolated() {
        let dir = TempDir::new().unwrap();
        let one = KeyValueScope::new(dir.path(), "one");
        let two = KeyValueScope::new(dir.path(), "two");
        one.set("k", "v").unwrap();
        assert_eq!(two.get("k"), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let scope = KeyValueScope::new(dir.path(), "test");
        scope.set("a", "1").unwrap();
        let mode = fs::metadata(scope.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
