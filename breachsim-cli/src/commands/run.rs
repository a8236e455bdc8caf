//! `breachsim run` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use breachsim_core::config::BreachsimConfig;
use breachsim_core::types::TerminationReason;
use breachsim_engine::{EngineConfig, EpisodeSummary, NetworkEnvBuilder};

use crate::agent;
use crate::cli::RunArgs;
use crate::commands::read_topology;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// The first episode uses the resolved seed; later episodes draw their seeds from the
/// environment RNG, so the whole run is reproducible from one seed.
pub async fn execute(
    args: RunArgs,
    config: &BreachsimConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if args.episodes == 0 {
        return Err(CliError::Command("--episodes must be at least 1".to_owned()));
    }
    if args.step_cap == 0 {
        return Err(CliError::Command("--step-cap must be at least 1".to_owned()));
    }

    let mut engine_config = EngineConfig::from_core(config)?;
    if let Some(max_steps) = args.max_steps {
        engine_config.max_steps = max_steps;
    }

    let mut builder = NetworkEnvBuilder::new().config(engine_config);
    if let Some(path) = &args.topology {
        builder = builder.topology(read_topology(path).await?);
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let mut env = builder.build()?;
    let mut agent = agent::build(args.agent, env.seed());

    info!(
        agent = agent.name(),
        episodes = args.episodes,
        seed = env.seed(),
        nodes = env.topology().node_count(),
        "starting run"
    );

    let mut episodes = Vec::with_capacity(args.episodes as usize);
    let mut seed = Some(env.seed());
    for _ in 0..args.episodes {
        let summary = env.run_episode(agent.as_mut(), seed.take(), args.step_cap)?;
        episodes.push(summary);
    }

    let report = RunReport::new(
        agent.name(),
        env.topology().node_count(),
        env.config().max_steps,
        episodes,
    );
    writer.render(&report)
}

/// Result of a `run` invocation.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub agent: String,
    pub node_count: usize,
    pub max_steps: u64,
    pub wins: usize,
    pub losses: usize,
    /// Episodes cut off by `--step-cap`
    pub truncated: usize,
    pub mean_reward: f64,
    pub mean_steps: f64,
    pub episodes: Vec<EpisodeSummary>,
}

impl RunReport {
    pub fn new(
        agent: &str,
        node_count: usize,
        max_steps: u64,
        episodes: Vec<EpisodeSummary>,
    ) -> Self {
        let count_of = |reason: Option<TerminationReason>| {
            episodes.iter().filter(|e| e.termination == reason).count()
        };
        let wins = count_of(Some(TerminationReason::StepLimit));
        let losses = count_of(Some(TerminationReason::Loss));
        let truncated = count_of(None);

        let n = episodes.len().max(1) as f64;
        let mean_reward = episodes.iter().map(|e| e.total_reward).sum::<f64>() / n;
        let mean_steps = episodes.iter().map(|e| e.steps as f64).sum::<f64>() / n;

        Self {
            agent: agent.to_owned(),
            node_count,
            max_steps,
            wins,
            losses,
            truncated,
            mean_reward,
            mean_steps,
            episodes,
        }
    }
}

fn outcome_label(termination: Option<TerminationReason>) -> colored::ColoredString {
    use colored::Colorize;

    match termination {
        Some(TerminationReason::StepLimit) => "win".green(),
        Some(TerminationReason::Loss) => "loss".red(),
        None => "truncated".yellow(),
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Agent: {}  Nodes: {}  Max steps: {}",
            self.agent.bold(),
            self.node_count,
            if self.max_steps == 0 {
                "unlimited".to_owned()
            } else {
                self.max_steps.to_string()
            }
        )?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<4} {:<20} {:>6} {:>10} {:<10} {:>5} {:>7} {:>8}",
            "#", "Seed", "Steps", "Reward", "Outcome", "Owned", "Patches", "Recovers"
        )?;
        writeln!(w, "{}", "-".repeat(77))?;

        for (index, episode) in self.episodes.iter().enumerate() {
            writeln!(
                w,
                "{:<4} {:<20} {:>6} {:>10.2} {:<10} {:>5} {:>7} {:>8}",
                index + 1,
                episode.seed,
                episode.steps,
                episode.total_reward,
                outcome_label(episode.termination),
                episode.compromised,
                episode.stats.effective_patches,
                episode.stats.recoveries,
            )?;
        }

        writeln!(w)?;
        writeln!(
            w,
            "Wins: {}  Losses: {}  Truncated: {}  Mean reward: {:.2}  Mean steps: {:.1}",
            self.wins.to_string().green(),
            self.losses.to_string().red(),
            self.truncated,
            self.mean_reward,
            self.mean_steps
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{AgentKind, OutputFormat};
    use breachsim_engine::EpisodeStats;

    fn summary(
        seed: u64,
        steps: u64,
        reward: f64,
        termination: Option<TerminationReason>,
    ) -> EpisodeSummary {
        EpisodeSummary {
            seed,
            steps,
            total_reward: reward,
            termination,
            compromised: 0,
            stats: EpisodeStats::default(),
        }
    }

    fn run_args(agent: AgentKind, episodes: u32) -> RunArgs {
        RunArgs {
            agent,
            episodes,
            seed: Some(42),
            max_steps: Some(30),
            step_cap: 1_000,
            topology: None,
        }
    }

    #[test]
    fn test_run_report_aggregates_outcomes() {
        let report = RunReport::new(
            "greedy",
            10,
            100,
            vec![
                summary(1, 100, 90.0, Some(TerminationReason::StepLimit)),
                summary(2, 20, -110.0, Some(TerminationReason::Loss)),
                summary(3, 60, -5.0, None),
            ],
        );
        assert_eq!(report.wins, 1);
        assert_eq!(report.losses, 1);
        assert_eq!(report.truncated, 1);
        assert!((report.mean_reward - (-25.0)).abs() < 1e-9);
        assert!((report.mean_steps - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_report_render_text() {
        let report = RunReport::new(
            "noop",
            5,
            0,
            vec![summary(7, 12, -104.0, Some(TerminationReason::Loss))],
        );
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("noop"));
        assert!(output.contains("unlimited"));
        assert!(output.contains("loss"));
        assert!(output.contains("-104.00"));
    }

    #[test]
    fn test_run_report_json_has_episode_list() {
        let report = RunReport::new(
            "random",
            5,
            10,
            vec![summary(7, 10, 100.0, Some(TerminationReason::StepLimit))],
        );
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["agent"], "random");
        assert_eq!(json["episodes"][0]["termination"], "step_limit");
    }

    #[tokio::test]
    async fn test_execute_runs_requested_episodes() {
        let config = BreachsimConfig::default();
        let writer = OutputWriter::new(OutputFormat::Json);
        execute(run_args(AgentKind::Greedy, 2), &config, &writer)
            .await
            .expect("run should succeed");
    }

    #[tokio::test]
    async fn test_execute_rejects_zero_episodes() {
        let config = BreachsimConfig::default();
        let writer = OutputWriter::new(OutputFormat::Text);
        let err = execute(run_args(AgentKind::Noop, 0), &config, &writer)
            .await
            .expect_err("zero episodes");
        assert!(matches!(err, CliError::Command(_)));
    }

    #[tokio::test]
    async fn test_execute_reports_invalid_engine_config() {
        let mut config = BreachsimConfig::default();
        config.red.targeting = "nearest".to_owned();
        let writer = OutputWriter::new(OutputFormat::Text);
        let err = execute(run_args(AgentKind::Noop, 1), &config, &writer)
            .await
            .expect_err("unknown targeting");
        assert_eq!(err.exit_code(), 2);
    }
}
