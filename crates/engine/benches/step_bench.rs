//! 스텝 오케스트레이터 벤치마크
//!
//! 노드 수에 따른 `step`/`reset` 비용과 관측 인코딩 성능을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use breachsim_engine::{EngineConfigBuilder, NetworkEnv, NetworkEnvBuilder};

fn create_env(node_count: usize, seed: u64) -> NetworkEnv {
    let config = EngineConfigBuilder::new()
        .node_count(node_count)
        .loss_compromised_count(node_count)
        .max_steps(0)
        .isolation_enabled(true)
        .build()
        .expect("bench config");
    NetworkEnvBuilder::new()
        .config(config)
        .seed(seed)
        .build()
        .expect("bench env")
}

fn bench_step_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_scaling");

    for node_count in &[10usize, 50, 200] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(node_count),
            node_count,
            |b, &n| {
                let mut env = create_env(n, 42);
                let size = env.action_space_size();
                let mut action = 0;
                b.iter(|| {
                    if env.is_done() {
                        let _ = env.reset(Some(42));
                    }
                    action = (action + 7) % size;
                    black_box(env.step(black_box(action)).ok());
                });
            },
        );
    }

    group.finish();
}

fn bench_reset(c: &mut Criterion) {
    let mut group = c.benchmark_group("reset");

    for node_count in &[10usize, 50, 200] {
        group.bench_with_input(
            BenchmarkId::from_parameter(node_count),
            node_count,
            |b, &n| {
                let mut env = create_env(n, 7);
                let mut seed = 0u64;
                b.iter(|| {
                    seed = seed.wrapping_add(1);
                    black_box(env.reset(Some(seed)).ok());
                });
            },
        );
    }

    group.finish();
}

fn bench_observation(c: &mut Criterion) {
    let env = create_env(200, 3);
    let mut group = c.benchmark_group("observation");
    group.throughput(Throughput::Elements(env.observation_space_size() as u64));
    group.bench_function("encode_200", |b| {
        b.iter(|| black_box(env.observation()));
    });
    group.finish();
}

criterion_group!(benches, bench_step_scaling, bench_reset, bench_observation);
criterion_main!(benches);
