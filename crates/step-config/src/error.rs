//! Error types for step-config

use crate::report::ValidationReport;

/// Result type for step-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a step's configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resolved configuration violates one or more rules.
    ///
    /// Carries every violation found in the run, never just the first.
    #[error("{0}")]
    Validation(ValidationReport),

    /// The bound configuration does not fit the step's options structure
    #[error("Options of step {step} cannot hold the bound configuration: {message}")]
    OptionsMismatch { step: String, message: String },

    /// The parameters JSON handed to the step is not a JSON object
    #[error("Invalid parameters JSON: {message}")]
    InvalidParametersJson { message: String },

    /// Writing to the shared pipeline environment failed
    #[error("Cannot write shared environment field {path}: {message}")]
    SharedEnvironmentWrite { path: String, message: String },

    // Transparent wrappers for underlying crate errors
    /// Metadata error from step-meta
    #[error(transparent)]
    Metadata(#[from] step_meta::Error),

    /// Filesystem error from step-fs
    #[error(transparent)]
    Fs(#[from] step_fs::Error),
}

impl Error {
    /// The validation report, if this is a validation failure.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Error::Validation(report) => Some(report),
            _ => None,
        }
    }
}
