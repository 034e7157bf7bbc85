//! Resolve a step's configuration

use colored::Colorize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use step_config::{
    Collaborators, ConfigDocument, ConfigResolver, DirectoryEnvironment, DirectorySecretStore,
    LayerSet, REDACTED, Redactor, ResolvedConfig, ResolverOptions, flags_layer,
    flags_layer_with_parameters_json, process_environment_layer,
};
use step_meta::StepMetadata;
use step_meta::options::{GithubCreateIssueOptions, HelmExecuteOptions};

use super::load_registry;
use crate::cli::ResolveArgs;
use crate::error::{CliError, Result};

/// Resolved values plus the bound options with secrets masked
struct Outcome {
    resolved: ResolvedConfig,
    options: Value,
}

/// Stack the default documents and the project document.
fn load_document(args: &ResolveArgs, metadata: &StepMetadata) -> Result<ConfigDocument> {
    let mut document = ConfigDocument::default();

    for path in &args.default_configs {
        tracing::debug!(path = %path.display(), "Loading default configuration");
        document.merge(&ConfigDocument::load(path)?, metadata);
    }

    if args.config.is_file() {
        tracing::debug!(path = %args.config.display(), "Loading project configuration");
        document.merge(&ConfigDocument::load(&args.config)?, metadata);
    } else {
        tracing::debug!(path = %args.config.display(), "No project configuration");
    }

    Ok(document)
}

fn build_layers(args: &ResolveArgs, metadata: &StepMetadata, document: &ConfigDocument) -> Result<LayerSet> {
    let explicit = args
        .params
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())));

    let flags = match &args.parameters_json {
        Some(json) => flags_layer_with_parameters_json(json, explicit)?,
        None => flags_layer(explicit),
    };

    let mut layers = LayerSet::new()
        .with(process_environment_layer(&args.env_prefix))
        .with(document.general_layer())
        .with(document.step_layer(metadata))
        .with(flags);
    if let Some(stage) = &args.stage {
        layers.insert(document.stage_layer(stage));
    }
    Ok(layers)
}

fn resolve_as<T: DeserializeOwned + Serialize>(
    resolver: &ConfigResolver<'_>,
    layers: LayerSet,
) -> Result<Outcome> {
    let resolution = resolver.resolve::<T>(layers)?;

    let mut options = serde_json::to_value(&resolution.options)?;
    if let Value::Object(fields) = &mut options {
        for (name, _) in resolution.resolved.secrets() {
            if let Some(field) = fields.get_mut(name) {
                *field = Value::String(REDACTED.to_string());
            }
        }
    }

    Ok(Outcome {
        resolved: resolution.resolved,
        options,
    })
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

fn print_outcome(metadata: &StepMetadata, stage: Option<&str>, outcome: &Outcome) {
    match stage {
        Some(stage) => println!("{} (stage {})", metadata.name().bold(), stage),
        None => println!("{}", metadata.name().bold()),
    }
    println!();

    let width = metadata
        .parameters()
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0);

    for param in metadata.parameters() {
        match outcome.resolved.get(&param.name) {
            Some(entry) => println!(
                "  {:<width$}  {}  {}",
                param.name.green(),
                render_value(&entry.display_value()),
                entry.provenance.to_string().dimmed()
            ),
            None => println!("  {:<width$}  {}", param.name.dimmed(), "(unset)".dimmed()),
        }
    }
}

fn outcome_json(metadata: &StepMetadata, stage: Option<&str>, outcome: &Outcome) -> Result<Value> {
    let mut parameters = Map::new();
    for (name, entry) in outcome.resolved.iter() {
        parameters.insert(
            name.to_string(),
            json!({
                "value": entry.display_value(),
                "provenance": serde_json::to_value(&entry.provenance)?,
                "secret": entry.secret,
            }),
        );
    }

    Ok(json!({
        "step": metadata.name(),
        "stage": stage,
        "parameters": parameters,
        "options": outcome.options,
    }))
}

/// Run the resolve command
pub fn run_resolve(args: &ResolveArgs, redactor: &Redactor) -> Result<()> {
    let registry = load_registry(&args.metadata)?;
    let metadata = registry.require(&args.step)?;

    let document = load_document(args, metadata)?;
    let layers = build_layers(args, metadata, &document)?;

    let secrets = DirectorySecretStore::new(&args.secrets_dir);
    let environment = DirectoryEnvironment::new(&args.environment_dir);
    let options = ResolverOptions::default()
        .env_prefix(args.env_prefix.clone())
        .list_delimiter(args.list_delimiter)
        .strict(args.strict);
    let resolver = ConfigResolver::new(
        metadata,
        options,
        Collaborators::new(&secrets, &environment, redactor),
    )?;

    let outcome = match metadata.name() {
        "githubCreateIssue" => resolve_as::<GithubCreateIssueOptions>(&resolver, layers),
        "helmExecute" => resolve_as::<HelmExecuteOptions>(&resolver, layers),
        _ => resolve_as::<Map<String, Value>>(&resolver, layers),
    };

    let stage = args.stage.as_deref();
    match outcome {
        Ok(outcome) if args.json => {
            let rendered = serde_json::to_string_pretty(&outcome_json(metadata, stage, &outcome)?)?;
            println!("{}", redactor.redact(&rendered));
            Ok(())
        }
        Ok(outcome) => {
            print_outcome(metadata, stage, &outcome);
            Ok(())
        }
        Err(CliError::Config(step_config::Error::Validation(report))) if args.json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Err(CliError::user(format!(
                "Configuration of step {} is invalid ({} problems)",
                report.step(),
                report.len()
            )))
        }
        Err(e) => Err(e),
    }
}
