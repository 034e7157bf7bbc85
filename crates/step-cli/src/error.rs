//! Error types for step-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from step-config, including validation reports
    #[error(transparent)]
    Config(#[from] step_config::Error),

    /// Error from step-meta
    #[error(transparent)]
    Meta(#[from] step_meta::Error),

    /// Error from step-fs
    #[error(transparent)]
    Fs(#[from] step_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON rendering or parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
