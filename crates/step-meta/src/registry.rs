//! Registry of known steps
//!
//! Maps step names (and step aliases) to their validated metadata.

use std::collections::BTreeMap;

use crate::builtins::builtin_steps;
use crate::schema::StepMetadata;
use crate::{Error, Result};

/// Registry of step metadata keyed by step name.
///
/// # Example
///
/// ```
/// use step_meta::StepRegistry;
///
/// let registry = StepRegistry::with_builtins().unwrap();
/// assert!(registry.get("githubCreateIssue").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: BTreeMap<String, StepMetadata>,
}

impl StepRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in steps registered.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for step in builtin_steps()? {
            registry.register(step)?;
        }
        Ok(registry)
    }

    /// Register a step.
    ///
    /// The metadata is validated first. A step whose name is already
    /// registered is rejected.
    pub fn register(&mut self, metadata: StepMetadata) -> Result<()> {
        metadata.validate()?;
        if self.steps.contains_key(metadata.name()) {
            return Err(Error::DuplicateStep {
                name: metadata.name().to_string(),
            });
        }
        tracing::debug!(step = metadata.name(), "Registered step metadata");
        self.steps.insert(metadata.name().to_string(), metadata);
        Ok(())
    }

    /// Register a step, replacing any step of the same name.
    pub fn register_or_replace(&mut self, metadata: StepMetadata) -> Result<()> {
        metadata.validate()?;
        self.steps.insert(metadata.name().to_string(), metadata);
        Ok(())
    }

    /// Look up a step by name or by one of its aliases.
    pub fn get(&self, name: &str) -> Option<&StepMetadata> {
        self.steps
            .get(name)
            .or_else(|| self.steps.values().find(|step| step.answers_to(name)))
    }

    /// Like [`StepRegistry::get`] but reports a missing step as an error.
    pub fn require(&self, name: &str) -> Result<&StepMetadata> {
        self.get(name).ok_or_else(|| Error::StepNotFound {
            name: name.to_string(),
        })
    }

    /// Sorted list of registered step names.
    pub fn list(&self) -> Vec<&str> {
        self.steps.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
