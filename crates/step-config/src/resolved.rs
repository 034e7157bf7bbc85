//! Resolved configuration
//!
//! One untyped value per parameter, annotated with where it came from and
//! whether it is secret.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Replacement text for secret values
pub const REDACTED: &str = "****";

/// The source that supplied a resolved value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum Provenance {
    /// A flag the invoker explicitly set
    Flag,
    /// A resource reference, e.g. `secret:githubVaultSecretName`
    ResourceReference { reference: String },
    /// The step section of the configuration
    Step { name: String },
    /// A stage section of the configuration
    Stage { name: String },
    /// The general section of the configuration
    General,
    /// A process environment variable
    Environment { variable: String },
    /// The declared default
    Default,
}

impl Provenance {
    /// Whether lists from this source arrive as delimited strings.
    pub fn delimited_lists(&self) -> bool {
        matches!(self, Provenance::Flag | Provenance::Environment { .. })
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Flag => f.write_str("flag"),
            Provenance::ResourceReference { reference } => write!(f, "reference {reference}"),
            Provenance::Step { name } => write!(f, "step {name}"),
            Provenance::Stage { name } => write!(f, "stage {name}"),
            Provenance::General => f.write_str("general"),
            Provenance::Environment { variable } => write!(f, "environment {variable}"),
            Provenance::Default => f.write_str("default"),
        }
    }
}

/// One resolved parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedValue {
    pub value: Value,
    pub provenance: Provenance,
    pub secret: bool,
}

impl ResolvedValue {
    /// The value, or [`REDACTED`] for secrets.
    pub fn display_value(&self) -> Value {
        if self.secret {
            Value::String(REDACTED.to_string())
        } else {
            self.value.clone()
        }
    }
}

/// Canonical parameter name -> resolved value.
///
/// Parameters no source supplied are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    entries: BTreeMap<String, ResolvedValue>,
}

impl ResolvedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: ResolvedValue) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.entries.get(name)
    }

    /// The raw value of a parameter.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|e| &e.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries marked secret.
    pub fn secrets(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.iter().filter(|(_, v)| v.secret)
    }

    /// All values as a JSON object with secrets replaced by [`REDACTED`].
    pub fn redacted_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.display_value()))
            .collect();
        Value::Object(map)
    }
}
