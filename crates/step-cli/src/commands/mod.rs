//! Command implementations for step-cli

pub mod check;
pub mod describe;
pub mod env;
pub mod list;
pub mod resolve;

pub use check::run_check_metadata;
pub use describe::run_describe;
pub use env::{run_read_env, run_write_env};
pub use list::run_list;
pub use resolve::run_resolve;

use step_meta::{MetadataLoader, StepRegistry};

use crate::cli::MetadataArgs;
use crate::error::Result;

/// Built-in steps plus every step loaded from `args`.
///
/// A loaded step replaces a built-in step of the same name.
pub fn load_registry(args: &MetadataArgs) -> Result<StepRegistry> {
    let mut registry = StepRegistry::with_builtins()?;
    let loader = MetadataLoader::new();

    for path in &args.paths {
        let steps = if path.is_dir() {
            loader.load_dir(path)?
        } else {
            vec![loader.load_file(path)?]
        };
        for step in steps {
            tracing::debug!(step = step.name(), path = %path.display(), "Loaded step metadata");
            registry.register_or_replace(step)?;
        }
    }

    Ok(registry)
}
