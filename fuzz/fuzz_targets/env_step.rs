#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use breachsim_engine::{EngineConfigBuilder, EngineError, NetworkEnvBuilder};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    seed: u64,
    /// 노드 수 (1-24로 제한)
    node_count: u8,
    /// 간선 확률 (x / 255)
    edge_probability: u8,
    isolation_enabled: bool,
    red_can_move: bool,
    /// 임의 액션 인덱스 (범위 밖 포함)
    actions: Vec<u16>,
}

fuzz_target!(|input: FuzzInput| {
    let node_count = usize::from(input.node_count % 24) + 1;
    let config = match EngineConfigBuilder::new()
        .node_count(node_count)
        .edge_probability(f64::from(input.edge_probability) / 255.0)
        .isolation_enabled(input.isolation_enabled)
        .red_can_move(input.red_can_move)
        .loss_compromised_count(node_count)
        .max_steps(64)
        .build()
    {
        Ok(config) => config,
        Err(_) => return,
    };

    let mut env = match NetworkEnvBuilder::new().config(config).seed(input.seed).build() {
        Ok(env) => env,
        Err(_) => return,
    };
    let bounds = env.config().bounds;

    for action in input.actions.iter().take(256) {
        match env.step(usize::from(*action)) {
            Ok(result) => {
                assert_eq!(result.observation.len(), env.observation_space_size());
                for row in env.machine_states() {
                    assert!(row[0] >= bounds.lower && row[0] <= bounds.upper);
                }
                assert!(result.info.compromised <= node_count);
            }
            Err(EngineError::ActionOutOfRange { size, .. }) => {
                assert_eq!(size, env.action_space_size());
            }
            Err(EngineError::EpisodeFinished) => {
                env.reset(None).expect("reset after finished episode");
            }
            Err(e) => panic!("unexpected step error: {e}"),
        }
    }
});
