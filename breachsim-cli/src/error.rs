//! CLI-specific error types and exit code mapping

use breachsim_core::error::BreachsimError;
use breachsim_engine::EngineError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Topology file could not be read or parsed.
    #[error("topology error: {0}")]
    Topology(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from breachsim-core.
    #[error("{0}")]
    Core(#[from] BreachsimError),

    /// Wrapped engine error.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                        |
    /// |------|--------------------------------|
    /// | 0    | Success                        |
    /// | 1    | General / command error        |
    /// | 2    | Configuration error            |
    /// | 3    | Topology error                 |
    /// | 10   | IO error                       |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::Core(BreachsimError::Config(_))
            | Self::Engine(EngineError::Config { .. }) => 2,
            Self::Topology(_)
            | Self::Core(BreachsimError::Topology(_))
            | Self::Engine(EngineError::Network(_)) => 3,
            Self::Io(_) | Self::Core(BreachsimError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Engine(_) => 1,
        }
    }
}
