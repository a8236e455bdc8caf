#![no_main]

use libfuzzer_sys::fuzz_target;

use breachsim_engine::{EngineConfig, NetworkEnvBuilder};
use breachsim_network::TopologySpec;

fuzz_target!(|data: &[u8]| {
    let Ok(spec) = serde_json::from_slice::<TopologySpec>(data) else {
        return;
    };
    // 거대한 그래프는 건너뜀
    if spec.node_count == 0 || spec.node_count > 256 || spec.edges.len() > 4096 {
        return;
    }

    let config = EngineConfig {
        loss_compromised_count: spec.node_count,
        max_steps: 16,
        ..EngineConfig::default()
    };
    let Ok(mut env) = NetworkEnvBuilder::new().config(config).topology(spec).seed(0).build() else {
        return;
    };

    let noop = 2 * env.topology().node_count();
    while !env.is_done() {
        env.step(noop).expect("noop step on valid topology");
    }
});
