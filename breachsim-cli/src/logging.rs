//! Logging initialization for the breachsim CLI.
//!
//! Configures `tracing-subscriber` from the `[general]` section of `BreachsimConfig`.
//! Logs go to stderr so `--output json` on stdout stays machine-readable.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use breachsim_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level` when set.
///
/// # Formats
///
/// * `"json"` - JSON lines
/// * `"pretty"` - Human-readable colored output
pub fn init_tracing(config: &GeneralConfig, log_level: Option<&str>) -> Result<()> {
    let level = log_level.unwrap_or(&config.log_level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_format_is_rejected() {
        let config = GeneralConfig {
            log_format: "xml".to_owned(),
            ..GeneralConfig::default()
        };
        let err = init_tracing(&config, None).expect_err("xml format should fail");
        assert!(err.to_string().contains("unknown log format"));
    }
}
