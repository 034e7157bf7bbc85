//! Schema definitions for step metadata documents
//!
//! - [`StepMetadata`] - one step: its identity and its parameter table
//! - [`ParameterSpec`] - one declared parameter

mod parameter;
mod step;

pub use parameter::{Alias, Condition, ParamType, ParameterSpec, ResourceReference, Scope};
pub use step::{StepInfo, StepInputs, StepMetadata, StepSpec};
