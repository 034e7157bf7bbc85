//! Precedence merger
//!
//! Picks one value per parameter, scanning sources from highest to lowest
//! precedence:
//!
//! flag > resource reference > step > stage > general > environment > default
//!
//! A key that is present wins even when its value is empty or `null`.

use step_meta::ParameterSpec;

use crate::layer::{ConfigLayer, LayerKind, LayerSet};
use crate::reference::ReferenceResolver;
use crate::resolved::{Provenance, ResolvedConfig, ResolvedValue};
use crate::scope;

/// Layers below the resource reference results, highest first
const LAYER_ORDER: [LayerKind; 5] = [
    LayerKind::Step,
    LayerKind::Stage,
    LayerKind::General,
    LayerKind::Environment,
    LayerKind::Default,
];

pub struct PrecedenceMerger<'a> {
    layers: &'a LayerSet,
    references: &'a ReferenceResolver<'a>,
    env_prefix: &'a str,
}

impl<'a> PrecedenceMerger<'a> {
    /// `layers` must be canonicalized.
    pub fn new(layers: &'a LayerSet, references: &'a ReferenceResolver<'a>, env_prefix: &'a str) -> Self {
        Self {
            layers,
            references,
            env_prefix,
        }
    }

    pub fn merge(&self, params: &[ParameterSpec]) -> ResolvedConfig {
        let mut resolved = ResolvedConfig::new();
        for spec in params {
            if let Some(value) = self.resolve_parameter(spec) {
                tracing::trace!(parameter = %spec.name, provenance = %value.provenance, "Resolved");
                resolved.insert(spec.name.clone(), value);
            }
        }
        resolved
    }

    /// The winning value for one parameter.
    pub fn resolve_parameter(&self, spec: &ParameterSpec) -> Option<ResolvedValue> {
        let secret = spec.is_secret();
        let resolved = |value, provenance| ResolvedValue {
            value,
            provenance,
            secret,
        };

        if let Some(value) = self.permitted_value(spec, LayerKind::Flags) {
            return Some(resolved(value.clone(), Provenance::Flag));
        }

        // Stores are only asked when no explicit flag decided the value
        if let Some(hit) = self.references.resolve(spec, self.layers) {
            let provenance = Provenance::ResourceReference {
                reference: hit.reference.to_string(),
            };
            return Some(resolved(hit.value, provenance));
        }

        LAYER_ORDER.iter().find_map(|kind| {
            let layer = self.layers.get(*kind)?;
            let value = self.permitted_value(spec, *kind)?;
            Some(resolved(value.clone(), self.provenance(layer, &spec.name)))
        })
    }

    fn permitted_value(&self, spec: &ParameterSpec, kind: LayerKind) -> Option<&'a serde_json::Value> {
        if !scope::permits(spec, kind) {
            return None;
        }
        self.layers.get(kind)?.get(&spec.name)
    }

    fn provenance(&self, layer: &ConfigLayer, key: &str) -> Provenance {
        match layer.kind() {
            LayerKind::Flags => Provenance::Flag,
            LayerKind::Step => Provenance::Step {
                name: layer.name().to_string(),
            },
            LayerKind::Stage => Provenance::Stage {
                name: layer.name().to_string(),
            },
            LayerKind::General => Provenance::General,
            LayerKind::Environment => Provenance::Environment {
                variable: format!("{}{}", self.env_prefix, layer.original_key(key)),
            },
            LayerKind::Default => Provenance::Default,
        }
    }
}
