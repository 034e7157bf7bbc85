//! List known steps

use colored::Colorize;

use super::load_registry;
use crate::cli::MetadataArgs;
use crate::error::Result;

/// Run the list command
pub fn run_list(metadata: &MetadataArgs) -> Result<()> {
    let registry = load_registry(metadata)?;

    println!("{}", "Available Steps".bold());
    println!();

    for name in registry.list() {
        let Some(step) = registry.get(name) else {
            continue;
        };
        let description = step.metadata.description.as_deref().unwrap_or("");
        println!("  {:<24} {}", name.green(), description);

        let aliases: Vec<String> = step
            .metadata
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
        if !aliases.is_empty() {
            println!("  {:<24} {} {}", "", "aliases:".dimmed(), aliases.join(", "));
        }
    }

    println!();
    println!(
        "{} {} steps. Use {} for details.",
        "Total:".dimmed(),
        registry.len(),
        "step-config describe <step>".cyan()
    );

    Ok(())
}
