//! Configuration resolution engine for pipeline steps.
//!
//! A step's options are assembled from several layers (defaults,
//! environment variables, the general/stage/step sections of the
//! configuration documents, explicitly set flags) plus resource references
//! into a secret store or the shared pipeline environment. The engine
//! canonicalizes aliases, merges by precedence, binds each value to its
//! declared type, validates the result and registers every secret with the
//! log redaction facility.
//!
//! ```no_run
//! use step_config::{
//!     Collaborators, ConfigDocument, ConfigResolver, LayerSet, MemoryEnvironment,
//!     MemorySecretStore, Redactor, ResolverOptions,
//! };
//! use step_meta::{StepRegistry, options::GithubCreateIssueOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = StepRegistry::with_builtins()?;
//! let metadata = registry.require("githubCreateIssue")?;
//! let document = ConfigDocument::load(std::path::Path::new(".pipeline/config.yml"))?;
//!
//! let layers = LayerSet::new()
//!     .with(document.general_layer())
//!     .with(document.stage_layer("Release"))
//!     .with(document.step_layer(metadata));
//!
//! let secrets = MemorySecretStore::new();
//! let environment = MemoryEnvironment::new();
//! let redactor = Redactor::new();
//! let resolver = ConfigResolver::new(
//!     metadata,
//!     ResolverOptions::default(),
//!     Collaborators::new(&secrets, &environment, &redactor),
//! )?;
//! let resolution = resolver.resolve::<GithubCreateIssueOptions>(layers)?;
//! println!("{}", resolution.options.title);
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod bind;
pub mod document;
pub mod engine;
pub mod error;
pub mod layer;
pub mod merge;
pub mod options;
pub mod reference;
pub mod report;
pub mod resolved;
pub mod scope;
pub mod secrets;
pub mod sources;
pub mod store;
pub mod validate;

pub use document::ConfigDocument;
pub use engine::{Collaborators, ConfigResolver, Resolution};
pub use error::{Error, Result};
pub use layer::{ConfigLayer, LayerKind, LayerSet};
pub use options::ResolverOptions;
pub use report::{ValidationReport, Violation, ViolationKind};
pub use resolved::{Provenance, REDACTED, ResolvedConfig, ResolvedValue};
pub use secrets::{Redactor, SecretRegistry};
pub use sources::{
    defaults_layer, environment_layer, flags_layer, flags_layer_with_parameters_json,
    process_environment_layer,
};
pub use store::{
    DirectoryEnvironment, DirectorySecretStore, Lookup, MemoryEnvironment, MemorySecretStore,
    SecretStore, SharedEnvironment,
};
