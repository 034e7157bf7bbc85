//! Configuration resolver
//!
//! Runs the whole pipeline for one step invocation:
//!
//! 1. canonicalize every layer (alias resolver)
//! 2. pick one value per parameter (scope filter, resource references,
//!    precedence merger)
//! 3. convert to declared types (type binder)
//! 4. check constraints (validator)
//! 5. register secrets with the log redaction facility
//!
//! Problems from every stage land in one [`ValidationReport`]; the run
//! fails only after all parameters have been processed.

use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use step_meta::{ResourceReference, StepMetadata};

use crate::alias::AliasResolver;
use crate::bind::bind;
use crate::layer::{LayerKind, LayerSet};
use crate::merge::PrecedenceMerger;
use crate::options::ResolverOptions;
use crate::reference::ReferenceResolver;
use crate::report::{ValidationReport, Violation, ViolationKind};
use crate::resolved::ResolvedConfig;
use crate::secrets::{SecretRegistry, register_secrets};
use crate::sources::defaults_layer;
use crate::store::{SecretStore, SharedEnvironment};
use crate::validate::validate;
use crate::{Error, Result};

/// Layers whose unknown keys are reported in strict mode
const STRICT_LAYERS: [LayerKind; 2] = [LayerKind::Step, LayerKind::Flags];

/// External collaborators of the engine
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub secrets: &'a dyn SecretStore,
    pub environment: &'a dyn SharedEnvironment,
    pub registry: &'a dyn SecretRegistry,
}

impl<'a> Collaborators<'a> {
    pub fn new(
        secrets: &'a dyn SecretStore,
        environment: &'a dyn SharedEnvironment,
        registry: &'a dyn SecretRegistry,
    ) -> Self {
        Self {
            secrets,
            environment,
            registry,
        }
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolution<T> {
    /// The bound options structure
    pub options: T,
    /// Untyped values with provenance, for diagnostics
    pub resolved: ResolvedConfig,
}

/// Resolves and validates the configuration of one step.
pub struct ConfigResolver<'a> {
    metadata: &'a StepMetadata,
    options: ResolverOptions,
    collaborators: Collaborators<'a>,
}

impl<'a> ConfigResolver<'a> {
    /// Create a resolver for `metadata`.
    ///
    /// Fails if the metadata itself is inconsistent.
    pub fn new(
        metadata: &'a StepMetadata,
        options: ResolverOptions,
        collaborators: Collaborators<'a>,
    ) -> Result<Self> {
        metadata.validate()?;
        Ok(Self {
            metadata,
            options,
            collaborators,
        })
    }

    pub fn metadata(&self) -> &StepMetadata {
        self.metadata
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve `layers` into an options structure `T`.
    ///
    /// The defaults layer is derived from the metadata; a defaults layer in
    /// `layers` is replaced. Secrets are registered even when validation
    /// fails.
    pub fn resolve<T: DeserializeOwned>(&self, layers: LayerSet) -> Result<Resolution<T>> {
        let step = self.metadata.name();
        let params = self.metadata.parameters();
        let mut report = ValidationReport::new(step);

        // Alias resolution
        let aliases = AliasResolver::new(params);
        let mut canonical = LayerSet::new();
        let mut ambiguous = BTreeSet::new();
        // Keys naming a secret store entry are configuration too
        let reference_keys: BTreeSet<&str> = params
            .iter()
            .flat_map(|param| &param.resource_refs)
            .filter_map(|reference| match reference {
                ResourceReference::Secret { name, .. } => Some(name.as_str()),
                ResourceReference::CommonPipelineEnvironment { .. } => None,
            })
            .collect();
        let raw_layers = layers.with(defaults_layer(self.metadata));
        for layer in raw_layers.iter() {
            tracing::debug!(step, layer = %layer.kind(), name = layer.name(), keys = layer.len(), "Layer loaded");
            let result = aliases.canonicalize(layer);

            for ambiguity in result.ambiguities {
                let message = format!(
                    "{} layer '{}' sets parameter '{}' more than once via {}",
                    ambiguity.layer,
                    ambiguity.layer_name,
                    ambiguity.parameter,
                    ambiguity.keys.join(", ")
                );
                ambiguous.insert(ambiguity.parameter.clone());
                report.push(Violation::new(
                    ambiguity.parameter,
                    ViolationKind::ConfigurationAmbiguity {
                        keys: ambiguity.keys,
                        layer: ambiguity.layer,
                    },
                    message,
                ));
            }

            if self.options.strict && STRICT_LAYERS.contains(&layer.kind()) {
                for key in result
                    .unknown_keys
                    .iter()
                    .filter(|key| !reference_keys.contains(key.as_str()))
                {
                    report.push(Violation::new(
                        key.clone(),
                        ViolationKind::Unknown { layer: layer.kind() },
                        format!("{} layer sets unknown parameter '{key}'", layer.kind()),
                    ));
                }
            }

            canonical.insert(result.layer);
        }

        // Merge
        let references =
            ReferenceResolver::new(self.collaborators.secrets, self.collaborators.environment);
        let merger = PrecedenceMerger::new(&canonical, &references, &self.options.env_prefix);
        let resolved = merger.merge(params);

        // Bind and validate
        let mut bound = bind(params, &resolved, self.options.list_delimiter, &mut report);
        // Ambiguous parameters are not checked again
        bound.skipped.extend(ambiguous);
        validate(params, &bound, &mut report);

        let registered = register_secrets(&resolved, &bound.values, self.collaborators.registry);
        if registered > 0 {
            tracing::debug!(step, registered, "Registered secret values for redaction");
        }

        if !report.is_valid() {
            for violation in report.iter() {
                tracing::error!(step, parameter = %violation.parameter, "{}", violation.message);
            }
            return Err(Error::Validation(report));
        }

        let options: T = serde_json::from_value(serde_json::Value::Object(bound.values)).map_err(|e| {
            Error::OptionsMismatch {
                step: step.to_string(),
                message: e.to_string(),
            }
        })?;

        tracing::info!(
            step,
            resolved = resolved.len(),
            secrets = resolved.secrets().count(),
            "Resolved step configuration"
        );

        Ok(Resolution { options, resolved })
    }
}
