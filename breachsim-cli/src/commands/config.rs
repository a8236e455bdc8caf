//! `breachsim config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use breachsim_core::config::BreachsimConfig;
use breachsim_engine::EngineConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::{config_source, load_config};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
pub const SECTIONS: [&str; 7] = [
    "general",
    "network",
    "red",
    "blue",
    "game",
    "reward",
    "observation",
];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load the configuration and check that the engine accepts it.
///
/// # Errors
///
/// Returns `CliError::Config` after rendering the report if validation fails.
async fn execute_validate(
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(source = %config_source(config_path), "validating configuration");

    let result = match load_config(config_path).await {
        Ok(loaded) => EngineConfig::from_core(&loaded.config)
            .map(|_| loaded.source)
            .map_err(CliError::from),
        Err(e) => Err(e),
    };

    let report = match result {
        Ok(source) => ConfigValidationReport {
            source,
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_source(config_path),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let loaded = load_config(config_path).await?;
    info!(source = %loaded.source, "showing configuration");

    let config_toml = match section.as_deref() {
        Some(name) => section_toml(&loaded.config, name)?,
        None => to_toml(&loaded.config)?,
    };

    let report = ConfigReport {
        source: loaded.source,
        section,
        config_toml,
    };
    writer.render(&report)
}

fn to_toml<T: Serialize>(value: &T) -> Result<String, CliError> {
    toml::to_string_pretty(value)
        .map_err(|e| CliError::Command(format!("failed to serialize configuration: {e}")))
}

fn section_toml(config: &BreachsimConfig, name: &str) -> Result<String, CliError> {
    match name {
        "general" => to_toml(&config.general),
        "network" => to_toml(&config.network),
        "red" => to_toml(&config.red),
        "blue" => to_toml(&config.blue),
        "game" => to_toml(&config.game),
        "reward" => to_toml(&config.reward),
        "observation" => to_toml(&config.observation),
        _ => Err(CliError::Command(format!(
            "unknown section: {} (expected: {})",
            name,
            SECTIONS.join(", ")
        ))),
    }
}

/// Configuration display report.
///
/// `config_toml` is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Empty when valid
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}
