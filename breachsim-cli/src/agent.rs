//! Scripted blue agents
//!
//! Every agent sees only what the environment exposes to the blue team: the observation
//! rows from `machine_states()` plus the public configuration.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use breachsim_core::types::NodeId;
use breachsim_engine::{BlueAction, BlueAgent, NetworkEnv};

use crate::cli::AgentKind;

/// Build the agent selected on the command line.
///
/// The random agent is seeded from `seed` so a run is reproducible end to end.
pub fn build(kind: AgentKind, seed: u64) -> Box<dyn BlueAgent> {
    match kind {
        AgentKind::Noop => Box::new(NoopAgent),
        AgentKind::Random => Box::new(RandomAgent::new(seed)),
        AgentKind::Greedy => Box::new(GreedyAgent),
    }
}

/// Encode `action` for the current environment, falling back to NoOp.
fn index_of(env: &NetworkEnv, action: BlueAction) -> usize {
    let node_count = env.topology().node_count();
    action
        .encode(node_count, env.config().blue.isolation_enabled)
        .unwrap_or(2 * node_count)
}

/// Always passes.
pub struct NoopAgent;

impl BlueAgent for NoopAgent {
    fn name(&self) -> &str {
        "noop"
    }

    fn select_action(&mut self, env: &NetworkEnv) -> usize {
        index_of(env, BlueAction::NoOp)
    }
}

/// Picks a uniformly random action index.
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl BlueAgent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn select_action(&mut self, env: &NetworkEnv) -> usize {
        self.rng.gen_range(0..env.action_space_size())
    }
}

/// Recovers the first detected compromise; otherwise patches the most vulnerable
/// clean node that is still above the patch floor.
pub struct GreedyAgent;

impl BlueAgent for GreedyAgent {
    fn name(&self) -> &str {
        "greedy"
    }

    fn select_action(&mut self, env: &NetworkEnv) -> usize {
        let states = env.machine_states();

        if let Some(index) = states.iter().position(|row| row[1] > 0.0) {
            return index_of(
                env,
                BlueAction::Recover {
                    node: NodeId(index),
                },
            );
        }

        let floor = env.config().bounds.floor;
        let mut best: Option<(usize, f64)> = None;
        for (index, row) in states.iter().enumerate() {
            let vulnerability = row[0];
            if vulnerability <= floor {
                continue;
            }
            if best.is_none_or(|(_, v)| vulnerability > v) {
                best = Some((index, vulnerability));
            }
        }

        match best {
            Some((index, _)) => index_of(
                env,
                BlueAction::Patch {
                    node: NodeId(index),
                },
            ),
            None => index_of(env, BlueAction::NoOp),
        }
    }
}
