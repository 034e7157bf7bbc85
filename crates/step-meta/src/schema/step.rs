//! Step metadata documents
//!
//! # Example YAML
//!
//! ```yaml
//! metadata:
//!   name: githubCreateIssue
//!   description: Create a new GitHub issue.
//! spec:
//!   inputs:
//!     params:
//!       - name: title
//!         mandatory: true
//! ```

use serde::{Deserialize, Serialize};

use super::parameter::{Alias, ParameterSpec};
use crate::{Error, Result};

/// Identity of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub name: String,
    /// Alternative names under which the step's configuration section may appear
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<Alias>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepInputs {
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(default)]
    pub inputs: StepInputs,
}

/// Complete metadata of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetadata {
    pub metadata: StepInfo,
    #[serde(default)]
    pub spec: StepSpec,
}

impl StepMetadata {
    /// Create metadata from a name and a parameter table.
    ///
    /// The table is not validated; call [`StepMetadata::validate`].
    pub fn new(name: impl Into<String>, params: Vec<ParameterSpec>) -> Self {
        Self {
            metadata: StepInfo {
                name: name.into(),
                aliases: Vec::new(),
                description: None,
            },
            spec: StepSpec {
                inputs: StepInputs { params },
            },
        }
    }

    /// Parse and validate a YAML metadata document.
    ///
    /// `source_name` only labels error messages.
    pub fn from_yaml(content: &str, source_name: &str) -> Result<Self> {
        let metadata: StepMetadata = serde_yaml::from_str(content).map_err(|e| Error::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.spec.inputs.params
    }

    /// Look up a parameter by canonical name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters().iter().find(|p| p.name == name)
    }

    /// Whether `name` is this step's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.metadata.name == name || self.metadata.aliases.iter().any(|a| a.name == name)
    }
}
