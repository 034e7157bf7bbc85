//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Step Config - resolve and validate pipeline step configuration
#[derive(Parser, Debug)]
#[command(name = "step-config")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Extra step metadata on top of the built-in steps
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataArgs {
    /// Metadata file or directory of metadata files (repeatable)
    #[arg(long = "metadata", value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve the configuration of a step
    ///
    /// Reads the configuration documents, PIPER_* environment variables,
    /// the shared pipeline environment, the secrets directory and the
    /// given parameters, then prints every resolved parameter with its
    /// source. Secret values are printed as ****.
    ///
    /// Examples:
    ///   step-config resolve githubCreateIssue --stage Release
    ///   step-config resolve helmExecute --param helmCommand=lint --json
    Resolve(ResolveArgs),

    /// List known steps
    List {
        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Show the parameter table of a step
    Describe {
        /// Step name or alias
        step: String,

        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Validate a step metadata file
    CheckMetadata {
        /// Metadata file to check
        file: PathBuf,
    },

    /// Write a field of the shared pipeline environment
    WriteEnv {
        /// Field path, e.g. github/owner
        path: String,

        /// Value to store
        value: String,

        /// Parse the value as JSON instead of storing it as a string
        #[arg(long)]
        json: bool,

        /// Shared environment directory
        #[arg(long, default_value = ".pipeline/commonPipelineEnvironment")]
        environment_dir: PathBuf,
    },

    /// Print a field of the shared pipeline environment
    ReadEnv {
        /// Field path, e.g. github/owner
        path: String,

        /// Shared environment directory
        #[arg(long, default_value = ".pipeline/commonPipelineEnvironment")]
        environment_dir: PathBuf,
    },
}

/// Arguments of the resolve command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ResolveArgs {
    /// Step name or alias
    pub step: String,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// Project configuration document
    #[arg(long, default_value = ".pipeline/config.yml")]
    pub config: PathBuf,

    /// Default configuration documents, applied before the project configuration (repeatable)
    #[arg(long = "default-config", value_name = "FILE")]
    pub default_configs: Vec<PathBuf>,

    /// Stage whose configuration section applies
    #[arg(long)]
    pub stage: Option<String>,

    /// Explicit parameter value (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Parameters as one JSON object; --param entries override it
    #[arg(long, env = "PIPER_parametersJSON")]
    pub parameters_json: Option<String>,

    /// Shared pipeline environment directory
    #[arg(long, default_value = ".pipeline/commonPipelineEnvironment")]
    pub environment_dir: PathBuf,

    /// Directory holding one file per secret
    #[arg(long, default_value = ".pipeline/secrets")]
    pub secrets_dir: PathBuf,

    /// Prefix of configuration environment variables
    #[arg(long, default_value = step_config::options::DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,

    /// Delimiter of list values given as strings
    #[arg(long, default_value_t = step_config::options::DEFAULT_LIST_DELIMITER)]
    pub list_delimiter: char,

    /// Report keys that match no parameter of the step
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,
}

/// Parse a `KEY=VALUE` argument. The value may be empty or contain `=`.
fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
