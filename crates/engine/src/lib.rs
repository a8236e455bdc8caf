#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`action`]: Blue action index encoding (`BlueAction`)
//! - [`blue`]: Blue action resolution and compromise detection
//! - [`red`]: Red agent turn policy (`RedAgent`, `RedOutcome`)
//! - [`reward`]: Per-step reward scoring (`RewardWeights`)
//! - [`observation`]: Observation vector encoding
//! - [`config`]: Engine configuration and builder
//! - [`env`]: Step orchestrator (`NetworkEnv`, `NetworkEnvBuilder`)
//! - [`error`]: Domain error types (`EngineError`)

pub mod action;
pub mod blue;
pub mod config;
pub mod env;
pub mod error;
pub mod observation;
pub mod red;
pub mod reward;

// --- Public API Re-exports ---

pub use action::{BlueAction, action_space_size};
pub use blue::BlueEffect;
pub use config::{BlueSettings, EngineConfig, EngineConfigBuilder, RedSettings, Targeting};
pub use env::{
    BlueAgent, EpisodeStats, EpisodeSummary, NetworkEnv, NetworkEnvBuilder, StepInfo, StepResult,
};
pub use error::EngineError;
pub use red::{RedAgent, RedOutcome, RedTurn};
pub use reward::{RewardWeights, StepEvents};
