//! Pipeline configuration documents
//!
//! A configuration document carries three sections:
//!
//! ```yaml
//! general:
//!   apiUrl: https://github.example.com/api/v3
//! stages:
//!   Build:
//!     dependency: build
//! steps:
//!   githubCreateIssue:
//!     title: Nightly scan findings
//! ```
//!
//! Several documents can be stacked (shipped defaults first, the project
//! configuration last) with [`ConfigDocument::merge`], which needs the
//! metadata of the step being resolved to tell which keys name the same
//! parameter.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use step_fs::{ConfigStore, DocumentFormat};
use step_meta::StepMetadata;

use crate::alias::AliasResolver;
use crate::layer::{ConfigLayer, LayerKind};
use crate::Result;

/// A section holding `null` (e.g. `steps:` with nothing below) is empty.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One parsed configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub general: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub stages: BTreeMap<String, Map<String, Value>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: BTreeMap<String, Map<String, Value>>,
}

impl ConfigDocument {
    /// Load a document from a YAML, JSON or TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Parse a YAML document.
    ///
    /// # Example
    ///
    /// ```
    /// use step_config::ConfigDocument;
    ///
    /// let doc = ConfigDocument::parse_yaml("general:\n  verbose: true\n").unwrap();
    /// assert_eq!(doc.general["verbose"], true);
    /// ```
    pub fn parse_yaml(content: &str) -> Result<Self> {
        Ok(ConfigStore::new().parse(content, DocumentFormat::Yaml, Path::new("<inline>"))?)
    }

    /// Merge another document into this one, for resolving `metadata`.
    ///
    /// The `other` document takes precedence. Scalars and lists are
    /// replaced; nested maps are merged key by key. A parameter set by
    /// `other` under any of its names replaces the value this document
    /// holds under another name of the same parameter.
    pub fn merge(&mut self, other: &ConfigDocument, metadata: &StepMetadata) {
        let aliases = AliasResolver::new(metadata.parameters());

        overlay(&mut self.general, &other.general, &aliases);

        for (stage, values) in &other.stages {
            overlay(self.stages.entry(stage.clone()).or_default(), values, &aliases);
        }

        for (step, values) in &other.steps {
            let base = self.steps.entry(step.clone()).or_default();
            if metadata.answers_to(step) {
                overlay(base, values, &aliases);
            } else {
                merge_map(base, values);
            }
        }
    }

    /// The `general` section as a layer.
    pub fn general_layer(&self) -> ConfigLayer {
        ConfigLayer::new(LayerKind::General, "general", self.general.clone())
    }

    /// The section of `stage` as a layer; empty when the stage is not configured.
    pub fn stage_layer(&self, stage: &str) -> ConfigLayer {
        let values = self.stages.get(stage).cloned().unwrap_or_default();
        ConfigLayer::new(LayerKind::Stage, stage, values)
    }

    /// The section of a step as a layer.
    ///
    /// Sections written under one of the step's aliases are folded in
    /// first; the section under the canonical step name wins on overlap.
    pub fn step_layer(&self, metadata: &StepMetadata) -> ConfigLayer {
        let aliases = AliasResolver::new(metadata.parameters());
        let mut values = Map::new();

        for alias in &metadata.metadata.aliases {
            if let Some(section) = self.steps.get(&alias.name) {
                if alias.deprecated {
                    tracing::warn!(
                        step = metadata.name(),
                        alias = %alias.name,
                        "Configuration uses a deprecated step name"
                    );
                }
                drop_shadowed(&mut values, section, &aliases);
                for (key, value) in section {
                    values.insert(key.clone(), value.clone());
                }
            }
        }

        if let Some(section) = self.steps.get(metadata.name()) {
            drop_shadowed(&mut values, section, &aliases);
            for (key, value) in section {
                values.insert(key.clone(), value.clone());
            }
        }

        ConfigLayer::new(LayerKind::Step, metadata.name(), values)
    }
}

/// Remove keys of `base` naming a parameter that `other` sets under another name.
///
/// Two names of one parameter inside `other` are left alone; the alias
/// resolver reports them.
fn drop_shadowed(base: &mut Map<String, Value>, other: &Map<String, Value>, aliases: &AliasResolver) {
    let claimed: BTreeSet<&str> = other.keys().filter_map(|key| aliases.canonical_name(key)).collect();
    let shadowed: Vec<String> = base
        .keys()
        .filter(|key| !other.contains_key(key.as_str()))
        .filter(|key| aliases.canonical_name(key).is_some_and(|name| claimed.contains(name)))
        .cloned()
        .collect();

    for key in shadowed {
        base.remove(&key);
    }
}

fn overlay(base: &mut Map<String, Value>, other: &Map<String, Value>, aliases: &AliasResolver) {
    drop_shadowed(base, other, aliases);
    merge_map(base, other);
}

fn merge_map(base: &mut Map<String, Value>, other: &Map<String, Value>) {
    for (key, other_value) in other {
        match base.get_mut(key) {
            Some(base_value) => deep_merge_value(base_value, other_value),
            None => {
                base.insert(key.clone(), other_value.clone());
            }
        }
    }
}

/// Deep merge two JSON values
///
/// If both values are objects, merge them recursively with `other` taking precedence.
/// Otherwise, `other` replaces `base`.
fn deep_merge_value(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Object(base_map), Value::Object(other_map)) => merge_map(base_map, other_map),
        (base, other) => {
            *base = other.clone();
        }
    }
}
