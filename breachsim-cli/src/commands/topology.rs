//! `breachsim topology` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use breachsim_core::config::BreachsimConfig;
use breachsim_core::types::NodeId;
use breachsim_engine::{EngineConfig, EngineError, NetworkEnv, NetworkEnvBuilder};

use crate::cli::TopologyArgs;
use crate::commands::read_topology;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `topology` command.
///
/// Builds the first episode exactly as `run` would and describes its network.
pub async fn execute(
    args: TopologyArgs,
    config: &BreachsimConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine_config = EngineConfig::from_core(config)?;
    let mut builder = NetworkEnvBuilder::new().config(engine_config);
    if let Some(path) = &args.file {
        builder = builder.topology(read_topology(path).await?);
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let env = builder.build()?;
    info!(seed = env.seed(), "describing topology");

    let report = TopologyReport::from_env(&env)?;
    writer.render(&report)
}

/// One node row of the topology report.
#[derive(Debug, Serialize)]
pub struct NodeRow {
    pub id: NodeId,
    pub uuid: String,
    pub vulnerability: f64,
    pub degree: usize,
    pub entry: bool,
}

/// Description of an episode's network.
#[derive(Debug, Serialize)]
pub struct TopologyReport {
    pub seed: u64,
    pub node_count: usize,
    pub edge_count: usize,
    pub entry_nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub nodes: Vec<NodeRow>,
}

impl TopologyReport {
    pub fn from_env(env: &NetworkEnv) -> Result<Self, CliError> {
        let topology = env.topology();
        let mut nodes = Vec::with_capacity(topology.node_count());
        for (id, state) in env.machines().iter() {
            nodes.push(NodeRow {
                id,
                uuid: state.uuid.to_string(),
                vulnerability: state.vulnerability,
                degree: topology.degree(id).map_err(EngineError::from)?,
                entry: topology.is_entry(id),
            });
        }

        Ok(Self {
            seed: env.seed(),
            node_count: topology.node_count(),
            edge_count: topology.edge_count(),
            entry_nodes: topology.entry_nodes().iter().copied().collect(),
            edges: topology.edges(),
            nodes,
        })
    }
}

impl Render for TopologyReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Topology (seed: {})  Nodes: {}  Edges: {}",
            self.seed.to_string().bold(),
            self.node_count,
            self.edge_count
        )?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<10} {:<38} {:>13} {:>6} {:<5}",
            "Node", "UUID", "Vulnerability", "Degree", "Entry"
        )?;
        writeln!(w, "{}", "-".repeat(76))?;

        for node in &self.nodes {
            let entry = if node.entry {
                "yes".cyan()
            } else {
                "-".normal()
            };
            writeln!(
                w,
                "{:<10} {:<38} {:>13.3} {:>6} {:<5}",
                node.id.to_string(),
                node.uuid,
                node.vulnerability,
                node.degree,
                entry
            )?;
        }

        writeln!(w)?;
        writeln!(w, "Edges:")?;
        for (a, b) in &self.edges {
            writeln!(w, "  {} -- {}", a, b)?;
        }
        Ok(())
    }
}
