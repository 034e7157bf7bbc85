//! Configuration layers
//!
//! A layer is one named source of raw values with a fixed precedence rank.
//! Layers are read-only once built; the alias resolver produces a new,
//! canonicalized layer rather than editing one in place.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use step_meta::Scope;

/// The kinds of layer, in ascending precedence order.
///
/// Resource reference results are not a layer; they are slotted between
/// [`LayerKind::Flags`] and [`LayerKind::Step`] by the merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Defaults declared in the step metadata
    Default,
    /// Process environment variables
    Environment,
    /// `general` section of the configuration documents
    General,
    /// `stages.<stage>` section of the configuration documents
    Stage,
    /// `steps.<step>` section of the configuration documents
    Step,
    /// Command-line flags the invoker explicitly supplied
    Flags,
}

impl LayerKind {
    /// Scope tag checked against a parameter's visibility.
    ///
    /// Defaults and environment variables carry no tag and may supply any
    /// parameter.
    pub fn scope(self) -> Option<Scope> {
        match self {
            LayerKind::General => Some(Scope::General),
            LayerKind::Stage => Some(Scope::Stages),
            LayerKind::Step => Some(Scope::Steps),
            LayerKind::Flags => Some(Scope::Parameters),
            LayerKind::Default | LayerKind::Environment => None,
        }
    }

    /// Whether this layer represents lists as delimited strings.
    pub fn delimited_lists(self) -> bool {
        matches!(self, LayerKind::Flags | LayerKind::Environment)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LayerKind::Default => "defaults",
            LayerKind::Environment => "environment",
            LayerKind::General => "general",
            LayerKind::Stage => "stage",
            LayerKind::Step => "step",
            LayerKind::Flags => "flags",
        };
        f.write_str(label)
    }
}

/// One named source of raw configuration values.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    kind: LayerKind,
    name: String,
    values: Map<String, Value>,
    /// Canonical key -> key as written in the source, for renamed keys
    original_keys: BTreeMap<String, String>,
}

impl ConfigLayer {
    pub fn new(kind: LayerKind, name: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            kind,
            name: name.into(),
            values,
            original_keys: BTreeMap::new(),
        }
    }

    /// An empty layer of the given kind.
    pub fn empty(kind: LayerKind, name: impl Into<String>) -> Self {
        Self::new(kind, name, Map::new())
    }

    pub(crate) fn with_original_keys(mut self, original_keys: BTreeMap<String, String>) -> Self {
        self.original_keys = original_keys;
        self
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Name of the layer, e.g. the stage or step it was read for.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// The value stored under `key`, if the layer explicitly contains it.
    ///
    /// An explicit empty string or `null` is still returned: "set to empty"
    /// differs from "unset".
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The key as written in the source for a canonicalized key.
    pub fn original_key<'a>(&'a self, key: &'a str) -> &'a str {
        self.original_keys.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Set a value, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }
}

/// The raw layers of one invocation, at most one per kind.
///
/// The defaults layer is derived from the step metadata by the resolver and
/// need not be supplied.
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    layers: BTreeMap<LayerKind, ConfigLayer>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer, replacing an earlier layer of the same kind.
    pub fn with(mut self, layer: ConfigLayer) -> Self {
        self.insert(layer);
        self
    }

    pub fn insert(&mut self, layer: ConfigLayer) {
        if let Some(previous) = self.layers.insert(layer.kind(), layer) {
            tracing::debug!(kind = %previous.kind(), name = previous.name(), "Replaced layer");
        }
    }

    pub fn get(&self, kind: LayerKind) -> Option<&ConfigLayer> {
        self.layers.get(&kind)
    }

    /// Layers in ascending precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigLayer> {
        self.layers.values()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(kind: LayerKind, value: Value) -> ConfigLayer {
        let Value::Object(map) = value else {
            panic!("layer fixture must be an object")
        };
        ConfigLayer::new(kind, kind.to_string(), map)
    }

    #[test]
    fn test_scope_tags() {
        assert_eq!(LayerKind::General.scope(), Some(Scope::General));
        assert_eq!(LayerKind::Stage.scope(), Some(Scope::Stages));
        assert_eq!(LayerKind::Step.scope(), Some(Scope::Steps));
        assert_eq!(LayerKind::Flags.scope(), Some(Scope::Parameters));
        assert_eq!(LayerKind::Environment.scope(), None);
        assert_eq!(LayerKind::Default.scope(), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(LayerKind::Flags > LayerKind::Step);
        assert!(LayerKind::Step > LayerKind::Stage);
        assert!(LayerKind::Stage > LayerKind::General);
        assert!(LayerKind::General > LayerKind::Environment);
        assert!(LayerKind::Environment > LayerKind::Default);
    }

    #[test]
    fn test_empty_value_is_present() {
        let layer = layer(LayerKind::Step, json!({"body": "", "title": null}));
        assert!(layer.contains("body"));
        assert_eq!(layer.get("body"), Some(&json!("")));
        assert_eq!(layer.get("title"), Some(&Value::Null));
        assert!(!layer.contains("owner"));
    }

    #[test]
    fn test_layer_set_replaces_same_kind_and_orders_by_precedence() {
        let set = LayerSet::new()
            .with(layer(LayerKind::Flags, json!({"a": 1})))
            .with(layer(LayerKind::General, json!({"a": 2})))
            .with(layer(LayerKind::Flags, json!({"a": 3})));

        assert_eq!(set.len(), 2);
        let kinds: Vec<LayerKind> = set.iter().map(ConfigLayer::kind).collect();
        assert_eq!(kinds, vec![LayerKind::General, LayerKind::Flags]);
        assert_eq!(set.get(LayerKind::Flags).unwrap().get("a"), Some(&json!(3)));
    }
}
