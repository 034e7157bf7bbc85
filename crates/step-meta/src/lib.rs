//! Step parameter metadata for the configuration engine.
//!
//! Every step declares a static table of parameters: canonical name,
//! aliases, type, visibility scope, default, allowed values and resource
//! references. This crate owns that table format, its invariants, and a
//! registry of known steps (including the embedded built-in steps).

pub mod builtins;
pub mod error;
pub mod loader;
pub mod options;
pub mod registry;
pub mod schema;
mod validation;

pub use error::{Error, Result};
pub use loader::MetadataLoader;
pub use registry::StepRegistry;
pub use schema::{
    Alias, Condition, ParamType, ParameterSpec, ResourceReference, Scope, StepInfo,
    StepInputs, StepMetadata, StepSpec,
};
