//! Error types for step-meta

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] step_fs::Error),

    #[error("Failed to parse metadata {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("Invalid metadata for step {step}: {}", problems.join("; "))]
    InvalidMetadata { step: String, problems: Vec<String> },

    #[error("Step not found: {name}")]
    StepNotFound { name: String },

    #[error("Step {name} is already registered")]
    DuplicateStep { name: String },
}
