//! Alias resolver
//!
//! Rewrites every key of a layer to its parameter's canonical name before
//! the layer takes part in the merge. A layer that names one parameter under
//! two keys (canonical and alias, or two aliases) is ambiguous: neither
//! value is used and the conflict is reported.

use serde_json::Map;
use std::collections::{BTreeMap, HashMap};
use step_meta::{Alias, ParameterSpec};

use crate::layer::{ConfigLayer, LayerKind};

/// One parameter named more than once in a single layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    /// Canonical name of the parameter
    pub parameter: String,
    /// Conflicting keys, in layer order
    pub keys: Vec<String>,
    pub layer: LayerKind,
    pub layer_name: String,
}

/// Result of canonicalizing one layer
#[derive(Debug, Clone)]
pub struct Canonicalized {
    pub layer: ConfigLayer,
    pub ambiguities: Vec<Ambiguity>,
    /// Keys matching no parameter; kept in the layer as-is
    pub unknown_keys: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Target<'a> {
    canonical: &'a str,
    alias: Option<&'a Alias>,
}

/// Index of every canonical name and alias of a parameter table.
#[derive(Debug, Clone)]
pub struct AliasResolver<'a> {
    index: HashMap<&'a str, Target<'a>>,
}

impl<'a> AliasResolver<'a> {
    /// Build the index.
    ///
    /// Assumes a validated table (no alias collisions).
    pub fn new(params: &'a [ParameterSpec]) -> Self {
        let mut index = HashMap::new();
        for param in params {
            index.insert(
                param.name.as_str(),
                Target {
                    canonical: param.name.as_str(),
                    alias: None,
                },
            );
            for alias in &param.aliases {
                index.insert(
                    alias.name.as_str(),
                    Target {
                        canonical: param.name.as_str(),
                        alias: Some(alias),
                    },
                );
            }
        }
        Self { index }
    }

    /// Canonical name for a canonical name or alias.
    pub fn canonical_name(&self, key: &str) -> Option<&'a str> {
        self.index.get(key).map(|t| t.canonical)
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Rewrite the keys of `layer` to canonical names.
    pub fn canonicalize(&self, layer: &ConfigLayer) -> Canonicalized {
        // canonical name -> keys naming it, in layer order
        let mut claims: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for key in layer.keys() {
            if let Some(target) = self.index.get(key) {
                claims.entry(target.canonical).or_default().push(key);
            }
        }

        let mut values = Map::new();
        let mut original_keys = BTreeMap::new();
        let mut ambiguities = Vec::new();
        let mut unknown_keys = Vec::new();

        for (key, value) in layer.values() {
            let Some(target) = self.index.get(key.as_str()) else {
                tracing::trace!(layer = %layer.kind(), key = %key, "Key matches no parameter");
                unknown_keys.push(key.clone());
                values.insert(key.clone(), value.clone());
                continue;
            };

            let claimants = &claims[target.canonical];
            if claimants.len() > 1 {
                // Reported once, on the first claimant
                if claimants[0] == key.as_str() {
                    ambiguities.push(Ambiguity {
                        parameter: target.canonical.to_string(),
                        keys: claimants.iter().map(|k| layer.original_key(k).to_string()).collect(),
                        layer: layer.kind(),
                        layer_name: layer.name().to_string(),
                    });
                }
                continue;
            }

            if let Some(alias) = target.alias {
                if alias.deprecated {
                    tracing::warn!(
                        layer = %layer.kind(),
                        alias = %alias.name,
                        parameter = target.canonical,
                        "Deprecated alias used; switch to the parameter name"
                    );
                }
            }

            let original = layer.original_key(key);
            if original != target.canonical {
                original_keys.insert(target.canonical.to_string(), original.to_string());
            }
            values.insert(target.canonical.to_string(), value.clone());
        }

        let canonical = ConfigLayer::new(layer.kind(), layer.name(), values)
            .with_original_keys(original_keys);

        Canonicalized {
            layer: canonical,
            ambiguities,
            unknown_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn params() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::new("token")
                .with_alias(Alias::new("githubToken"))
                .with_alias(Alias::deprecated("access_token")),
            ParameterSpec::new("owner").with_alias(Alias::new("githubOrg")),
        ]
    }

    fn step_layer(value: Value) -> ConfigLayer {
        let Value::Object(map) = value else {
            panic!("layer fixture must be an object")
        };
        ConfigLayer::new(LayerKind::Step, "demo", map)
    }

    #[test]
    fn test_alias_rewritten_to_canonical_name() {
        let params = params();
        let resolver = AliasResolver::new(&params);

        let result = resolver.canonicalize(&step_layer(json!({"githubOrg": "octo"})));

        assert!(result.ambiguities.is_empty());
        assert_eq!(result.layer.get("owner"), Some(&json!("octo")));
        assert!(!result.layer.contains("githubOrg"));
        assert_eq!(result.layer.original_key("owner"), "githubOrg");
    }

    #[test]
    fn test_canonical_and_alias_together_are_ambiguous() {
        let params = params();
        let resolver = AliasResolver::new(&params);

        let result =
            resolver.canonicalize(&step_layer(json!({"token": "a", "githubToken": "b", "owner": "o"})));

        assert_eq!(result.ambiguities.len(), 1);
        assert_eq!(result.ambiguities[0].parameter, "token");
        assert_eq!(result.ambiguities[0].keys, vec!["token", "githubToken"]);
        assert!(!result.layer.contains("token"));
        assert_eq!(result.layer.get("owner"), Some(&json!("o")));
    }

    #[test]
    fn test_two_aliases_of_one_parameter_are_ambiguous() {
        let params = params();
        let resolver = AliasResolver::new(&params);

        let result =
            resolver.canonicalize(&step_layer(json!({"githubToken": "a", "access_token": "b"})));

        assert_eq!(result.ambiguities.len(), 1);
        assert!(!result.layer.contains("token"));
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let params = params();
        let resolver = AliasResolver::new(&params);

        let result = resolver.canonicalize(&step_layer(json!({"somethingElse": 1})));

        assert_eq!(result.unknown_keys, vec!["somethingElse"]);
        assert_eq!(result.layer.get("somethingElse"), Some(&json!(1)));
    }

    #[test]
    fn test_canonical_name_lookup() {
        let params = params();
        let resolver = AliasResolver::new(&params);
        assert_eq!(resolver.canonical_name("access_token"), Some("token"));
        assert_eq!(resolver.canonical_name("token"), Some("token"));
        assert_eq!(resolver.canonical_name("nope"), None);
        assert!(resolver.is_known("githubOrg"));
    }
}
