//! Integration tests for configuration files consumed by the `breachsim` commands.
//!
//! Loads real TOML and JSON files from disk and checks that they flow into a runnable
//! environment.

use std::fs;

use breachsim_core::config::BreachsimConfig;
use breachsim_engine::{EngineConfig, NetworkEnvBuilder};
use breachsim_network::TopologySpec;
use tempfile::TempDir;

#[tokio::test]
async fn test_config_valid_toml_builds_environment() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("breachsim.toml");
    let valid_config = r#"
[general]
log_level = "debug"
log_format = "json"
seed = 7

[network]
node_count = 8
edge_probability = 0.4

[game]
loss_compromised_count = 6
max_steps = 25
"#;
    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config and building an environment from it
    let config = BreachsimConfig::from_file(&config_path)
        .await
        .expect("valid config should load");
    let engine_config = EngineConfig::from_core(&config).expect("engine config");
    let mut env = NetworkEnvBuilder::new()
        .config(engine_config)
        .build()
        .expect("env should build");

    // Then: The environment reflects the file
    assert_eq!(env.seed(), 7);
    assert_eq!(env.topology().node_count(), 8);
    assert_eq!(env.observation_space_size(), 16);
    let noop = env.action_space_size() - 1;
    while !env.is_done() {
        env.step(noop).expect("step");
    }
    assert!(env.total_steps() <= 25);
}

#[tokio::test]
async fn test_config_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write bad config");

    let result = BreachsimConfig::from_file(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_missing_file() {
    let config_path = std::path::PathBuf::from("/nonexistent/breachsim.toml");
    let result = BreachsimConfig::from_file(&config_path).await;
    assert!(result.is_err(), "missing file should fail to load");
}

#[tokio::test]
async fn test_config_empty_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("empty.toml");
    fs::write(&config_path, "").expect("should write empty file");

    let config = BreachsimConfig::from_file(&config_path)
        .await
        .expect("empty config should load with defaults");
    assert_eq!(config.network.node_count, 10);
    assert_eq!(config.game.max_steps, 500);
    EngineConfig::from_core(&config).expect("defaults are valid for the engine");
}

#[tokio::test]
async fn test_config_invalid_policy_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("breachsim.toml");
    fs::write(&config_path, "[red]\ntargeting = \"nearest\"\n").expect("should write config");

    let result = BreachsimConfig::from_file(&config_path).await;
    assert!(result.is_err(), "unknown targeting policy should fail validation");
}

#[tokio::test]
async fn test_config_boundary_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("breachsim.toml");
    let boundary_config = r#"
[network]
node_count = 1
edge_probability = 0.0
vulnerability_lower = 0.2
vulnerability_upper = 0.2
entry_node_count = 1

[red]
skill = 100.0
attack_success_threshold = 0.0

[game]
loss_compromised_count = 1
max_steps = 0
"#;
    fs::write(&config_path, boundary_config).expect("should write config");

    let config = BreachsimConfig::from_file(&config_path)
        .await
        .expect("boundary config should load");
    let engine_config = EngineConfig::from_core(&config).expect("engine config");
    let mut env = NetworkEnvBuilder::new()
        .config(engine_config)
        .seed(1)
        .build()
        .expect("single node env");

    // 1-node network: the only node is the entry and falls on the first step
    let result = env.step(2).expect("noop step");
    assert!(result.done);
    assert_eq!(env.compromised_count(), 1);
}

#[tokio::test]
async fn test_topology_json_file_drives_environment() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let topology_path = temp_dir.path().join("topology.json");
    let topology = r#"{
  "node_count": 4,
  "edges": [[0, 1], [1, 2], [2, 3]],
  "entry_nodes": { "policy": "explicit", "nodes": [3] }
}"#;
    fs::write(&topology_path, topology).expect("should write topology");

    let content = tokio::fs::read_to_string(&topology_path)
        .await
        .expect("read topology");
    let spec: TopologySpec = serde_json::from_str(&content).expect("parse topology");
    spec.validate().expect("valid topology");

    let config = BreachsimConfig::default();
    let mut engine_config = EngineConfig::from_core(&config).expect("engine config");
    engine_config.loss_compromised_count = 4;
    let env = NetworkEnvBuilder::new()
        .config(engine_config)
        .topology(spec)
        .seed(3)
        .build()
        .expect("env");

    assert_eq!(env.topology().node_count(), 4);
    assert_eq!(env.topology().edge_count(), 3);
    assert!(env.topology().is_entry(breachsim_core::types::NodeId(3)));
}
