//! Directory-backed stores
//!
//! Layout used by both stores: one file per entry, nested directories for
//! slash-separated paths.
//!
//! ```text
//! <root>/
//!   artifactVersion          plain text value
//!   github/owner             plain text value
//!   custom/valuesMapping.json  JSON value
//! ```

use serde_json::Value;
use std::path::{Path, PathBuf};
use step_fs::ConfigStore;

use super::{Lookup, SecretStore, SharedEnvironment, path_segments};
use crate::{Error, Result};

fn entry_path(root: &Path, path: &str) -> Option<PathBuf> {
    let segments = path_segments(path)?;
    let mut full = root.to_path_buf();
    full.extend(segments);
    Some(full)
}

fn json_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".json");
    path.with_file_name(name)
}

fn trim_line_end(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// Secrets stored as one file per secret under a root directory.
///
/// A single trailing newline is not part of the secret.
#[derive(Debug, Clone)]
pub struct DirectorySecretStore {
    root: PathBuf,
}

impl DirectorySecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SecretStore for DirectorySecretStore {
    fn lookup(&self, name: &str) -> Lookup<String> {
        if !self.root.is_dir() {
            return Lookup::Unavailable(format!(
                "secret directory {} does not exist",
                self.root.display()
            ));
        }
        let Some(path) = entry_path(&self.root, name) else {
            tracing::debug!(name, "Rejected secret name");
            return Lookup::NotFound;
        };
        match step_fs::io::read_text_if_exists(&path) {
            Ok(Some(text)) => Lookup::Found(trim_line_end(text)),
            Ok(None) => Lookup::NotFound,
            Err(e) => Lookup::Unavailable(e.to_string()),
        }
    }
}

/// Shared environment stored as files under a root directory.
///
/// Fields written as strings are plain text files; any other value is
/// stored JSON-encoded in a `<field>.json` file. A missing root directory
/// reads as an empty environment. Fields are never deleted.
#[derive(Debug, Clone)]
pub struct DirectoryEnvironment {
    root: PathBuf,
}

impl DirectoryEnvironment {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_error(path: &str, message: impl Into<String>) -> Error {
        Error::SharedEnvironmentWrite {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl SharedEnvironment for DirectoryEnvironment {
    fn lookup(&self, path: &str) -> Lookup<Value> {
        let Some(file) = entry_path(&self.root, path) else {
            tracing::debug!(path, "Rejected environment path");
            return Lookup::NotFound;
        };

        let json_file = json_sibling(&file);
        match step_fs::io::read_text_if_exists(&json_file) {
            Ok(Some(text)) => {
                return match serde_json::from_str(&text) {
                    Ok(value) => Lookup::Found(value),
                    Err(e) => Lookup::Unavailable(format!(
                        "{} is not valid JSON: {e}",
                        json_file.display()
                    )),
                };
            }
            Ok(None) => {}
            Err(e) => return Lookup::Unavailable(e.to_string()),
        }

        if file.is_dir() {
            return Lookup::NotFound;
        }
        match step_fs::io::read_text_if_exists(&file) {
            Ok(Some(text)) => Lookup::Found(Value::String(text)),
            Ok(None) => Lookup::NotFound,
            Err(e) => Lookup::Unavailable(e.to_string()),
        }
    }

    fn write(&self, path: &str, value: &Value) -> Result<()> {
        let file = entry_path(&self.root, path)
            .ok_or_else(|| Self::write_error(path, "invalid field path"))?;

        let (target, stale) = match value {
            Value::String(_) => (file.clone(), json_sibling(&file)),
            _ => (json_sibling(&file), file.clone()),
        };

        match value {
            Value::String(text) => step_fs::io::write_text(&target, text)?,
            other => ConfigStore::new().save(&target, other)?,
        }

        // The other encoding of the same field must not outlive this write
        if stale.is_file() {
            std::fs::remove_file(&stale)
                .map_err(|e| Self::write_error(path, format!("{}: {e}", stale.display())))?;
        }
        tracing::debug!(path, file = %target.display(), "Wrote shared environment field");
        Ok(())
    }
}
