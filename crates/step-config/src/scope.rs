//! Scope filter
//!
//! A layer may supply a parameter only if the layer's scope tag is one of
//! the parameter's visibility scopes. Values from other layers are ignored
//! for that parameter, silently.

use step_meta::ParameterSpec;

use crate::layer::LayerKind;

/// Whether a layer of `kind` may supply a value for `spec`.
///
/// Layers without a scope tag (defaults, environment) always may.
pub fn permits(spec: &ParameterSpec, kind: LayerKind) -> bool {
    match kind.scope() {
        Some(scope) => spec.is_visible_in(scope),
        None => true,
    }
}
