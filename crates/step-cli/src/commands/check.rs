//! Validate a metadata file

use colored::Colorize;
use std::path::Path;
use step_meta::MetadataLoader;

use crate::error::Result;

/// Run the check-metadata command
pub fn run_check_metadata(file: &Path) -> Result<()> {
    let step = MetadataLoader::new().load_file(file)?;

    println!(
        "{} {} is valid: step {} with {} parameters",
        "OK".green().bold(),
        file.display(),
        step.name().cyan(),
        step.parameters().len()
    );
    Ok(())
}
