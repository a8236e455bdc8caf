//! breachsim CLI entry point
//!
//! Loads the effective configuration, installs the tracing subscriber from its
//! `[general]` section, and dispatches to a subcommand handler. Command failures are
//! reported on stderr and mapped to exit codes via [`CliError::exit_code`].

mod agent;
mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::error;

use crate::cli::{Cli, Commands};
use crate::commands::LoadedConfig;
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config,
        log_level,
        output,
        command,
    } = Cli::parse();

    let loaded = commands::load_config(config.as_deref()).await;
    let general = loaded
        .as_ref()
        .map(|l| l.config.general.clone())
        .unwrap_or_default();
    logging::init_tracing(&general, log_level.as_deref())?;
    breachsim_core::metrics::describe_all();

    let writer = OutputWriter::new(output);
    if let Err(err) = dispatch(command, config.as_deref(), loaded, &writer).await {
        error!(error = %err, "command failed");
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(err.exit_code());
    }

    Ok(())
}

async fn dispatch(
    command: Commands,
    config_path: Option<&Path>,
    loaded: Result<LoadedConfig, CliError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        // `config` reloads on its own so load failures end up in its report
        Commands::Config(args) => commands::config::execute(args, config_path, writer).await,
        Commands::Run(args) => commands::run::execute(args, &loaded?.config, writer).await,
        Commands::Topology(args) => {
            commands::topology::execute(args, &loaded?.config, writer).await
        }
    }
}
