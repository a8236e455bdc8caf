//! Command handlers -- one module per subcommand

pub mod config;
pub mod run;
pub mod topology;

use std::path::Path;

use tracing::debug;

use breachsim_core::config::BreachsimConfig;
use breachsim_network::TopologySpec;

use crate::error::CliError;

/// Configuration file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "breachsim.toml";

/// Effective configuration plus a description of where it came from.
pub struct LoadedConfig {
    pub config: BreachsimConfig,
    pub source: String,
}

/// Describe the configuration source for reports, whether or not loading succeeded.
pub fn config_source(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => DEFAULT_CONFIG_PATH.to_owned(),
    }
}

/// Load the effective configuration.
///
/// An explicit path must exist. Without one, `./breachsim.toml` is used when present;
/// otherwise built-in defaults with environment overrides apply.
pub async fn load_config(path: Option<&Path>) -> Result<LoadedConfig, CliError> {
    if let Some(path) = path {
        let config = BreachsimConfig::load(path).await?;
        return Ok(LoadedConfig {
            config,
            source: path.display().to_string(),
        });
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if tokio::fs::try_exists(default_path).await? {
        let config = BreachsimConfig::load(default_path).await?;
        return Ok(LoadedConfig {
            config,
            source: DEFAULT_CONFIG_PATH.to_owned(),
        });
    }

    debug!("no configuration file found, using defaults");
    let mut config = BreachsimConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(LoadedConfig {
        config,
        source: "(defaults)".to_owned(),
    })
}

/// Read a JSON topology file and validate it.
pub async fn read_topology(path: &Path) -> Result<TopologySpec, CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::Topology(format!("{}: {}", path.display(), e)))?;
    let spec: TopologySpec = serde_json::from_str(&content)
        .map_err(|e| CliError::Topology(format!("{}: {}", path.display(), e)))?;
    spec.validate()
        .map_err(|e| CliError::Topology(format!("{}: {}", path.display(), e)))?;
    Ok(spec)
}
