//! Resource reference resolver
//!
//! Tries a parameter's references in declared order and returns the first
//! value a store actually has. Misses and unreachable stores fall through
//! to the next reference; if all fail the parameter is left to the layers.

use serde_json::Value;
use step_meta::{ParameterSpec, ResourceReference};

use crate::layer::{LayerKind, LayerSet};
use crate::store::{Lookup, SecretStore, SharedEnvironment};

/// Layers consulted for the entry name of a secret reference
const NAME_LOOKUP_ORDER: [LayerKind; 5] = [
    LayerKind::Flags,
    LayerKind::Step,
    LayerKind::Stage,
    LayerKind::General,
    LayerKind::Environment,
];

/// A value produced by a resource reference
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceHit {
    pub value: Value,
    pub reference: ResourceReference,
}

pub struct ReferenceResolver<'a> {
    secrets: &'a dyn SecretStore,
    environment: &'a dyn SharedEnvironment,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(secrets: &'a dyn SecretStore, environment: &'a dyn SharedEnvironment) -> Self {
        Self {
            secrets,
            environment,
        }
    }

    /// First successful reference of `spec`, if any.
    ///
    /// `layers` must already be canonicalized; they supply secret entry
    /// names configured under the reference's `name` key.
    pub fn resolve(&self, spec: &ParameterSpec, layers: &LayerSet) -> Option<ReferenceHit> {
        for reference in &spec.resource_refs {
            let outcome = match reference {
                ResourceReference::Secret { name, default } => {
                    let entry = secret_entry_name(name, default.as_deref(), layers);
                    tracing::debug!(parameter = %spec.name, %reference, entry = %entry, "Looking up secret");
                    match self.secrets.lookup(&entry) {
                        Lookup::Found(secret) => Lookup::Found(Value::String(secret)),
                        Lookup::NotFound => Lookup::NotFound,
                        Lookup::Unavailable(reason) => Lookup::Unavailable(reason),
                    }
                }
                ResourceReference::CommonPipelineEnvironment { param } => {
                    tracing::debug!(parameter = %spec.name, %reference, "Looking up shared environment");
                    self.environment.lookup(param)
                }
            };

            match outcome {
                Lookup::Found(value) => {
                    return Some(ReferenceHit {
                        value,
                        reference: reference.clone(),
                    });
                }
                Lookup::NotFound => {
                    tracing::debug!(parameter = %spec.name, %reference, "Reference has no value");
                }
                Lookup::Unavailable(reason) => {
                    tracing::debug!(parameter = %spec.name, %reference, %reason, "Reference store unavailable");
                }
            }
        }
        None
    }
}

/// Secret entry name: the configured `name` key, else the reference
/// default, else `name` itself.
fn secret_entry_name(name: &str, default: Option<&str>, layers: &LayerSet) -> String {
    let configured = NAME_LOOKUP_ORDER
        .iter()
        .filter_map(|kind| layers.get(*kind))
        .find_map(|layer| match layer.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        });

    configured
        .or_else(|| default.map(str::to_string))
        .unwrap_or_else(|| name.to_string())
}
