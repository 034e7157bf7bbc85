//! Built-in step metadata
//!
//! The parameter tables are data: YAML documents embedded at compile time
//! and parsed (and validated) when a registry is built.

use crate::schema::StepMetadata;
use crate::Result;

const GITHUB_CREATE_ISSUE: &str = include_str!("../metadata/githubCreateIssue.yaml");
const HELM_EXECUTE: &str = include_str!("../metadata/helmExecute.yaml");

/// Embedded metadata documents as `(source name, content)` pairs.
pub const BUILTIN_DOCUMENTS: &[(&str, &str)] = &[
    ("githubCreateIssue.yaml", GITHUB_CREATE_ISSUE),
    ("helmExecute.yaml", HELM_EXECUTE),
];

/// Parse every built-in step.
pub fn builtin_steps() -> Result<Vec<StepMetadata>> {
    BUILTIN_DOCUMENTS
        .iter()
        .map(|(source_name, content)| StepMetadata::from_yaml(content, source_name))
        .collect()
}
