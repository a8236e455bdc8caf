//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// breachsim -- red/blue network attack simulation.
///
/// Use `breachsim <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "breachsim", version, about, long_about = None)]
pub struct Cli {
    /// Path to the breachsim.toml configuration file.
    ///
    /// When omitted, `./breachsim.toml` is used if present, otherwise built-in defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run episodes with a scripted blue agent.
    Run(RunArgs),

    /// Generate and describe the episode topology.
    Topology(TopologyArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Scripted blue agents shipped with the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    /// Always pass.
    Noop,
    /// Uniformly random action index.
    Random,
    /// Recover detected compromises first, then patch the most vulnerable node.
    Greedy,
}

/// Run one or more episodes.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Blue agent policy.
    #[arg(short, long, default_value = "greedy")]
    pub agent: AgentKind,

    /// Number of episodes to run.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub episodes: u32,

    /// Seed of the first episode (overrides `[general] seed`).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override `[game] max_steps` (0 = unlimited).
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Hard cap on steps per episode, applied even when `max_steps` is 0.
    #[arg(long, default_value_t = 10_000)]
    pub step_cap: u64,

    /// JSON topology file (`node_count`, `edges`, `entry_nodes`).
    #[arg(long)]
    pub topology: Option<PathBuf>,
}

// ---- topology ----

/// Describe the topology for a seed.
#[derive(Args, Debug)]
pub struct TopologyArgs {
    /// Seed used to generate the topology (overrides `[general] seed`).
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON topology file to load instead of generating one.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

// ---- config ----

/// Manage breachsim configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, network, red, blue, game, reward, observation).
        #[arg(long)]
        section: Option<String>,
    },
}
