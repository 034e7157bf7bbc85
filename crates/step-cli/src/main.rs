//! Step Config CLI
//!
//! Resolves, validates and prints the configuration of pipeline steps.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use step_config::Redactor;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    let redactor = Arc::new(Redactor::new());
    if let Err(e) = run(Arc::clone(&redactor)) {
        eprintln!("{}: {}", "error".red().bold(), redactor.redact(&e.to_string()));
        std::process::exit(1);
    }
}

fn run(redactor: Arc<Redactor>) -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, Arc::clone(&redactor)) {
        eprintln!("{} could not set up logging: {e}", "warning:".yellow().bold());
    }
    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd, &redactor),
        None => {
            println!("{} Step configuration resolver", "step-config".green().bold());
            println!();
            println!("Run {} for available commands.", "step-config --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, redactor: &Redactor) -> Result<()> {
    match cmd {
        Commands::Resolve(args) => commands::run_resolve(&args, redactor),
        Commands::List { metadata } => commands::run_list(&metadata),
        Commands::Describe { step, metadata } => commands::run_describe(&step, &metadata),
        Commands::CheckMetadata { file } => commands::run_check_metadata(&file),
        Commands::WriteEnv {
            path,
            value,
            json,
            environment_dir,
        } => commands::run_write_env(&environment_dir, &path, &value, json),
        Commands::ReadEnv {
            path,
            environment_dir,
        } => commands::run_read_env(&environment_dir, &path),
    }
}
