//! Describe a step's parameter table

use colored::Colorize;
use serde_json::Value;
use step_meta::ParameterSpec;

use super::load_registry;
use crate::cli::MetadataArgs;
use crate::error::Result;

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

fn print_parameter(param: &ParameterSpec) {
    let mut flags = Vec::new();
    if param.mandatory {
        flags.push("mandatory".red().to_string());
    }
    if param.is_secret() {
        flags.push("secret".yellow().to_string());
    }
    println!(
        "  {} {} {}",
        param.name.green().bold(),
        param.param_type.to_string().cyan(),
        flags.join(" ")
    );

    if let Some(description) = &param.description {
        println!("      {description}");
    }

    let scopes: Vec<String> = param.scope.iter().map(ToString::to_string).collect();
    println!("      {} {}", "scope:".dimmed(), scopes.join(", "));

    if let Some(default) = &param.default {
        println!("      {} {}", "default:".dimmed(), render_value(default));
    }
    if !param.aliases.is_empty() {
        let aliases: Vec<String> = param
            .aliases
            .iter()
            .map(|a| {
                if a.deprecated {
                    format!("{} (deprecated)", a.name)
                } else {
                    a.name.clone()
                }
            })
            .collect();
        println!("      {} {}", "aliases:".dimmed(), aliases.join(", "));
    }
    if !param.possible_values.is_empty() {
        let values: Vec<String> = param.possible_values.iter().map(render_value).collect();
        println!("      {} {}", "allowed:".dimmed(), values.join(", "));
    }
    if !param.mandatory_if.is_empty() {
        let conditions: Vec<String> = param
            .mandatory_if
            .iter()
            .map(|c| format!("{}={}", c.name, render_value(&c.value)))
            .collect();
        println!("      {} {}", "mandatory if:".dimmed(), conditions.join(" or "));
    }
    for reference in &param.resource_refs {
        println!("      {} {}", "reference:".dimmed(), reference);
    }
}

/// Run the describe command
pub fn run_describe(step: &str, metadata: &MetadataArgs) -> Result<()> {
    let registry = load_registry(metadata)?;
    let step = registry.require(step)?;

    println!("{}", step.name().bold());
    if let Some(description) = &step.metadata.description {
        println!("{description}");
    }
    println!();

    for param in step.parameters() {
        print_parameter(param);
    }

    Ok(())
}
