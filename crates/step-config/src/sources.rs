//! Source readers
//!
//! Build raw layers from the non-document sources: metadata defaults,
//! environment variables and explicitly supplied flags. Document layers
//! come from [`crate::ConfigDocument`].

use serde_json::{Map, Value};
use step_meta::StepMetadata;

use crate::layer::{ConfigLayer, LayerKind};
use crate::{Error, Result};

/// Defaults declared in the step metadata.
///
/// Parameters without a declared default are absent from the layer.
pub fn defaults_layer(metadata: &StepMetadata) -> ConfigLayer {
    let values: Map<String, Value> = metadata
        .parameters()
        .iter()
        .filter_map(|param| param.default.clone().map(|d| (param.name.clone(), d)))
        .collect();
    ConfigLayer::new(LayerKind::Default, metadata.name(), values)
}

/// Environment variables `<prefix><key>` as a layer keyed by `<key>`.
///
/// Variables without the prefix, or with nothing after it, are ignored.
/// Values stay strings; the type binder converts them.
pub fn environment_layer<I, K, V>(vars: I, prefix: &str) -> ConfigLayer
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut values = Map::new();
    for (name, value) in vars {
        if let Some(key) = name.as_ref().strip_prefix(prefix) {
            if !key.is_empty() {
                values.insert(key.to_string(), Value::String(value.into()));
            }
        }
    }
    ConfigLayer::new(LayerKind::Environment, prefix.trim_end_matches('_'), values)
}

/// Environment layer read from the current process.
pub fn process_environment_layer(prefix: &str) -> ConfigLayer {
    environment_layer(std::env::vars(), prefix)
}

/// Flags the invoker explicitly supplied.
///
/// Only flags actually given on the command line belong here; flag-library
/// defaults are not explicit and must be left out.
pub fn flags_layer<I, K>(flags: I) -> ConfigLayer
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let values: Map<String, Value> = flags.into_iter().map(|(k, v)| (k.into(), v)).collect();
    ConfigLayer::new(LayerKind::Flags, "flags", values)
}

/// Flags layer seeded from a parameters JSON object.
///
/// Entries of `explicit` override entries of the JSON object. JSON values
/// keep their native types.
pub fn flags_layer_with_parameters_json<I, K>(parameters_json: &str, explicit: I) -> Result<ConfigLayer>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let parsed: Value =
        serde_json::from_str(parameters_json).map_err(|e| Error::InvalidParametersJson {
            message: e.to_string(),
        })?;

    let Value::Object(mut values) = parsed else {
        return Err(Error::InvalidParametersJson {
            message: "expected a JSON object".to_string(),
        });
    };

    for (key, value) in explicit {
        values.insert(key.into(), value);
    }

    Ok(ConfigLayer::new(LayerKind::Flags, "flags", values))
}
