//! [`TestWorkspace`] builder for pipeline configuration scenarios.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Directory of the project configuration document
pub const CONFIG_PATH: &str = ".pipeline/config.yml";
/// Directory of the shared pipeline environment
pub const ENVIRONMENT_DIR: &str = ".pipeline/commonPipelineEnvironment";
/// Directory holding one file per secret
pub const SECRETS_DIR: &str = ".pipeline/secrets";

/// A temporary pipeline workspace.
///
/// # Example
///
/// ```rust,no_run
/// use step_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.write_config("general:\n  owner: octo\n");
/// ws.write_secret("github", "s3cr3t");
/// ws.write_env_field("github/repository", "hello-world");
/// ws.assert_file_exists(".pipeline/config.yml");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the workspace.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path(CONFIG_PATH)
    }

    pub fn environment_dir(&self) -> PathBuf {
        self.path(ENVIRONMENT_DIR)
    }

    pub fn secrets_dir(&self) -> PathBuf {
        self.path(SECRETS_DIR)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
        full_path
    }

    /// Write the project configuration document.
    pub fn write_config(&self, yaml: &str) -> PathBuf {
        self.write_file(CONFIG_PATH, yaml)
    }

    /// Write a step metadata file under `.pipeline/metadata/`.
    pub fn write_metadata(&self, file_name: &str, yaml: &str) -> PathBuf {
        self.write_file(&format!(".pipeline/metadata/{file_name}"), yaml)
    }

    /// Write a secret as a single-line file.
    pub fn write_secret(&self, name: &str, value: &str) -> PathBuf {
        self.write_file(&format!("{SECRETS_DIR}/{name}"), &format!("{value}\n"))
    }

    /// Create the secrets directory without any secrets.
    pub fn create_secrets_dir(&self) -> PathBuf {
        let dir = self.secrets_dir();
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write a plain-text shared-environment field.
    pub fn write_env_field(&self, path: &str, value: &str) -> PathBuf {
        self.write_file(&format!("{ENVIRONMENT_DIR}/{path}"), value)
    }

    /// Write a JSON shared-environment field.
    pub fn write_env_json(&self, path: &str, value: &Value) -> PathBuf {
        self.write_file(&format!("{ENVIRONMENT_DIR}/{path}.json"), &value.to_string())
    }

    /// Read a file of the workspace.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let full_path = self.path(relative);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            file_content.contains(content),
            "File {relative} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
