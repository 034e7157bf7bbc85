//! Read and write the shared pipeline environment

use serde_json::Value;
use std::path::Path;
use step_config::{DirectoryEnvironment, Lookup, SharedEnvironment};

use crate::error::{CliError, Result};

/// Run the write-env command
pub fn run_write_env(environment_dir: &Path, path: &str, value: &str, json: bool) -> Result<()> {
    let value = if json {
        serde_json::from_str(value)?
    } else {
        Value::String(value.to_string())
    };

    DirectoryEnvironment::new(environment_dir).write(path, &value)?;
    tracing::info!(path, "Shared environment field written");
    Ok(())
}

/// Run the read-env command
pub fn run_read_env(environment_dir: &Path, path: &str) -> Result<()> {
    match DirectoryEnvironment::new(environment_dir).lookup(path) {
        Lookup::Found(Value::String(text)) => {
            println!("{text}");
            Ok(())
        }
        Lookup::Found(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Lookup::NotFound => Err(CliError::user(format!(
            "Shared environment field '{path}' is not set"
        ))),
        Lookup::Unavailable(reason) => Err(CliError::user(format!(
            "Shared environment field '{path}' cannot be read: {reason}"
        ))),
    }
}
