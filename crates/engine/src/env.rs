//! 스텝 오케스트레이터
//!
//! [`NetworkEnv`]는 에피소드마다 하나의 [`Topology`]와 [`MachineStore`]를 독점 소유하고,
//! `step` 호출마다 레드 턴 → 탐지 → 블루 턴 → 집계 → 종료 판정 → 보상 → 관측 순으로
//! 상태를 전이시킵니다.
//!
//! 모든 난수는 환경이 소유한 `ChaCha8Rng` 하나에서 나오며, 리졸버에는 `&mut`로 빌려줍니다.

use metrics::{counter, gauge, histogram};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use breachsim_core::metrics as m;
use breachsim_core::types::{NodeId, TerminationReason};
use breachsim_network::{MachineStore, NodeFilter, Topology, TopologySpec, generator};

use crate::action::{self, BlueAction};
use crate::blue::{self, BlueEffect};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::observation;
use crate::red::{RedAgent, RedOutcome, RedTurn};
use crate::reward::StepEvents;

/// 블루 팀 액션 선택기
///
/// 학습 에이전트나 스크립트 정책이 구현합니다. 반환값은 정수 액션 인덱스입니다.
pub trait BlueAgent {
    /// 에이전트 이름
    fn name(&self) -> &str;

    /// 현재 환경 상태를 보고 다음 액션 인덱스를 고릅니다.
    fn select_action(&mut self, env: &NetworkEnv) -> usize;
}

/// 스텝 부가 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepInfo {
    /// 이번 스텝 번호 (1부터)
    pub step: u64,
    /// 레드 턴 기록
    pub red: RedTurn,
    /// 블루 액션 적용 결과
    pub blue: BlueEffect,
    /// 이번 스텝에 새로 탐지된 노드
    pub detected: Vec<NodeId>,
    /// 실제 침해 노드 수
    pub compromised: usize,
    /// 미침해 노드 수
    pub uncompromised: usize,
    /// 블루 팀이 인지한 침해 노드 수
    pub observed_compromised: usize,
    /// 격리된 노드 수
    pub isolated: usize,
    /// 레드 팀 현재 위치
    pub red_position: Option<NodeId>,
    /// 레드 팀 보유 제로데이 수
    pub zero_days: u32,
    /// 레드 팀 제로데이 개발 진행도
    pub exploit_progress: u32,
    /// 에피소드 종료 사유
    pub termination: Option<TerminationReason>,
}

/// `step` 결과
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// 다음 관측 벡터
    pub observation: Vec<f64>,
    /// 이번 스텝 보상
    pub reward: f64,
    /// 에피소드 종료 여부
    pub done: bool,
    /// 부가 정보
    pub info: StepInfo,
}

/// 에피소드 누적 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EpisodeStats {
    /// 침해 횟수
    pub compromises: usize,
    /// 제로데이 사용 횟수
    pub zero_days_used: usize,
    /// 유효 패치 횟수
    pub effective_patches: usize,
    /// 침해 노드 복구 횟수
    pub recoveries: usize,
    /// 탐지 횟수
    pub detections: usize,
    /// 레드 팀 위치 상실 횟수
    pub evictions: usize,
    /// 최대 동시 침해 노드 수
    pub peak_compromised: usize,
}

/// 에피소드 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    /// 에피소드 시드
    pub seed: u64,
    /// 진행한 스텝 수
    pub steps: u64,
    /// 누적 보상
    pub total_reward: f64,
    /// 종료 사유 (스텝 상한으로 중단되면 `None`)
    pub termination: Option<TerminationReason>,
    /// 종료 시점 침해 노드 수
    pub compromised: usize,
    /// 누적 통계
    pub stats: EpisodeStats,
}

#[derive(Debug, Clone, Default)]
struct EpisodeState {
    steps: u64,
    total_reward: f64,
    done: bool,
    termination: Option<TerminationReason>,
    compromised: usize,
    uncompromised: usize,
    stats: EpisodeStats,
}

impl EpisodeState {
    fn new(node_count: usize) -> Self {
        Self {
            uncompromised: node_count,
            ..Self::default()
        }
    }
}

/// 새 에피소드를 구성하는 부품
struct Episode {
    topology: Topology,
    machines: MachineStore,
    rng: ChaCha8Rng,
}

impl Episode {
    fn build(
        config: &EngineConfig,
        fixed: Option<&TopologySpec>,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let generated;
        let spec = match fixed {
            Some(spec) => spec,
            None => {
                generated = generator::random_connected(
                    config.node_count,
                    config.edge_probability,
                    config.entry_selection.clone(),
                    &mut rng,
                )?;
                &generated
            }
        };
        config.validate_for_nodes(spec.node_count)?;

        let topology = Topology::from_spec(spec, &mut rng)?;
        let machines = MachineStore::generate(spec.node_count, config.bounds, &mut rng)?;
        Ok(Self {
            topology,
            machines,
            rng,
        })
    }
}

/// 레드/블루 네트워크 시뮬레이션 환경
#[derive(Debug)]
pub struct NetworkEnv {
    config: EngineConfig,
    fixed_topology: Option<TopologySpec>,
    topology: Topology,
    machines: MachineStore,
    red: RedAgent,
    rng: ChaCha8Rng,
    seed: u64,
    state: EpisodeState,
}

impl NetworkEnv {
    /// 새 에피소드를 시작하고 첫 관측을 반환합니다.
    ///
    /// 시드를 주지 않으면 이전 RNG에서 새 시드를 뽑습니다.
    /// 외부 토폴로지가 설정되어 있으면 간선은 유지하고 진입 노드와 격리 상태만 새로 만듭니다.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<Vec<f64>, EngineError> {
        let seed = seed.unwrap_or_else(|| self.rng.next_u64());
        let episode = Episode::build(&self.config, self.fixed_topology.as_ref(), seed)?;
        Ok(self.install(episode, seed))
    }

    /// 외부 토폴로지로 교체한 뒤 새 에피소드를 시작합니다.
    ///
    /// 이후의 `reset`도 이 토폴로지를 사용합니다.
    pub fn reset_with_topology(
        &mut self,
        spec: TopologySpec,
        seed: Option<u64>,
    ) -> Result<Vec<f64>, EngineError> {
        let seed = seed.unwrap_or_else(|| self.rng.next_u64());
        let episode = Episode::build(&self.config, Some(&spec), seed)?;
        self.fixed_topology = Some(spec);
        Ok(self.install(episode, seed))
    }

    fn install(&mut self, episode: Episode, seed: u64) -> Vec<f64> {
        self.topology = episode.topology;
        self.machines = episode.machines;
        self.rng = episode.rng;
        self.seed = seed;
        self.red.reset();
        self.state = EpisodeState::new(self.machines.len());
        self.announce_reset();
        self.observation()
    }

    fn announce_reset(&self) {
        counter!(m::ENGINE_RESETS_TOTAL).increment(1);
        gauge!(m::ENGINE_COMPROMISED_NODES).set(0.0);
        gauge!(m::ENGINE_ISOLATED_NODES).set(0.0);
        info!(
            seed = self.seed,
            nodes = self.topology.node_count(),
            edges = self.topology.edge_count(),
            entry = ?self.topology.entry_nodes(),
            "episode reset"
        );
    }

    /// 블루 액션 인덱스 하나로 한 스텝을 진행합니다.
    ///
    /// 종료된 에피소드나 범위 밖 액션은 상태를 바꾸지 않고 에러를 반환합니다.
    pub fn step(&mut self, action: usize) -> Result<StepResult, EngineError> {
        if self.state.done {
            return Err(EngineError::EpisodeFinished);
        }
        let node_count = self.topology.node_count();
        let action = BlueAction::decode(action, node_count, self.config.blue.isolation_enabled)?;

        let red = self
            .red
            .take_turn(&self.topology, &mut self.machines, &mut self.rng)?;
        let detected = blue::detect_compromises(
            &mut self.machines,
            self.config.blue.detection_chance,
            &mut self.rng,
        )?;
        let effect = blue::apply(
            action,
            &self.config.blue,
            &mut self.topology,
            &mut self.machines,
        )?;

        self.state.steps += 1;
        let compromised = self.machines.count(NodeFilter::TrueCompromised);
        self.state.compromised = compromised;
        self.state.uncompromised = node_count - compromised;

        let termination = if compromised >= self.config.loss_compromised_count {
            Some(TerminationReason::Loss)
        } else if self.config.max_steps > 0 && self.state.steps >= self.config.max_steps {
            Some(TerminationReason::StepLimit)
        } else {
            None
        };

        let events = StepEvents {
            new_compromises: usize::from(red.outcome.compromised_node().is_some()),
            effective_patches: usize::from(effect.effective_patch),
            recovered_compromised: usize::from(effect.recovered_compromised),
            termination,
        };
        let reward = self.config.reward.score(&events);
        self.state.total_reward += reward;
        self.record_stats(&red, &effect, detected.len(), &events);

        let isolated = self.topology.isolated_nodes().len();
        counter!(m::ENGINE_STEPS_TOTAL).increment(1);
        counter!(m::BLUE_ACTIONS_TOTAL, m::LABEL_ACTION => action.kind()).increment(1);
        counter!(m::BLUE_DETECTIONS_TOTAL).increment(detected.len() as u64);
        gauge!(m::ENGINE_COMPROMISED_NODES).set(compromised as f64);
        gauge!(m::ENGINE_ISOLATED_NODES).set(isolated as f64);

        debug!(
            step = self.state.steps,
            red = red.outcome.kind(),
            blue = %action,
            compromised,
            reward,
            "step resolved"
        );

        if let Some(reason) = termination {
            self.finish(reason);
        }

        Ok(StepResult {
            observation: self.observation(),
            reward,
            done: self.state.done,
            info: StepInfo {
                step: self.state.steps,
                red,
                blue: effect,
                detected,
                compromised,
                uncompromised: self.state.uncompromised,
                observed_compromised: self.machines.count(NodeFilter::ObservedCompromised),
                isolated,
                red_position: self.red.current(),
                zero_days: self.red.zero_days(),
                exploit_progress: self.red.exploit_progress(),
                termination,
            },
        })
    }

    fn record_stats(
        &mut self,
        red: &RedTurn,
        effect: &BlueEffect,
        detections: usize,
        events: &StepEvents,
    ) {
        let stats = &mut self.state.stats;
        stats.compromises += events.new_compromises;
        if matches!(red.outcome, RedOutcome::ZeroDay { .. }) {
            stats.zero_days_used += 1;
        }
        stats.effective_patches += events.effective_patches;
        stats.recoveries += usize::from(effect.recovered_compromised);
        stats.detections += detections;
        stats.evictions += usize::from(red.evicted);
        stats.peak_compromised = stats.peak_compromised.max(self.state.compromised);
    }

    fn finish(&mut self, reason: TerminationReason) {
        self.state.done = true;
        self.state.termination = Some(reason);
        counter!(m::ENGINE_EPISODES_TOTAL, m::LABEL_REASON => reason.as_str()).increment(1);
        histogram!(m::ENGINE_EPISODE_LENGTH_STEPS).record(self.state.steps as f64);
        info!(
            seed = self.seed,
            steps = self.state.steps,
            reason = %reason,
            total_reward = self.state.total_reward,
            compromised = self.state.compromised,
            "episode finished"
        );
    }

    /// 에이전트로 에피소드 하나를 끝까지(또는 `step_cap`까지) 진행합니다.
    pub fn run_episode(
        &mut self,
        agent: &mut dyn BlueAgent,
        seed: Option<u64>,
        step_cap: u64,
    ) -> Result<EpisodeSummary, EngineError> {
        self.reset(seed)?;
        while !self.state.done && self.state.steps < step_cap {
            let action = agent.select_action(self);
            self.step(action)?;
        }
        Ok(self.summary())
    }

    /// 현재 에피소드 요약
    pub fn summary(&self) -> EpisodeSummary {
        EpisodeSummary {
            seed: self.seed,
            steps: self.state.steps,
            total_reward: self.state.total_reward,
            termination: self.state.termination,
            compromised: self.state.compromised,
            stats: self.state.stats,
        }
    }

    /// 현재 관측 벡터
    pub fn observation(&self) -> Vec<f64> {
        observation::encode(&self.machines, self.config.use_true_state)
    }

    /// 노드별 `[취약성, 침해 표시]`
    pub fn machine_states(&self) -> Vec<[f64; observation::FIELDS_PER_NODE]> {
        observation::machine_states(&self.machines, self.config.use_true_state)
    }

    /// 액션 공간 크기
    pub fn action_space_size(&self) -> usize {
        action::action_space_size(
            self.topology.node_count(),
            self.config.blue.isolation_enabled,
        )
    }

    /// 관측 벡터 길이
    pub fn observation_space_size(&self) -> usize {
        observation::observation_size(self.topology.node_count())
    }

    /// 누적 보상
    pub fn total_rewards(&self) -> f64 {
        self.state.total_reward
    }

    /// 진행한 스텝 수
    pub fn total_steps(&self) -> u64 {
        self.state.steps
    }

    /// 에피소드 종료 여부
    pub fn is_done(&self) -> bool {
        self.state.done
    }

    /// 종료 사유
    pub fn termination(&self) -> Option<TerminationReason> {
        self.state.termination
    }

    /// 실제 침해 노드 수
    pub fn compromised_count(&self) -> usize {
        self.state.compromised
    }

    /// 미침해 노드 수
    pub fn uncompromised_count(&self) -> usize {
        self.state.uncompromised
    }

    /// 누적 통계
    pub fn stats(&self) -> &EpisodeStats {
        &self.state.stats
    }

    /// 레드 팀 위치 기록
    pub fn red_trail(&self) -> &[NodeId] {
        self.red.trail()
    }

    /// 레드 팀 에이전트
    pub fn red(&self) -> &RedAgent {
        &self.red
    }

    /// 현재 토폴로지
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// 현재 노드 저장소
    pub fn machines(&self) -> &MachineStore {
        &self.machines
    }

    /// 현재 에피소드 시드
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 엔진 설정
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// 환경 빌더
///
/// 빌드 시 첫 리셋까지 수행하므로 반환된 환경은 바로 `step`할 수 있습니다.
#[derive(Default)]
pub struct NetworkEnvBuilder {
    config: EngineConfig,
    topology: Option<TopologySpec>,
    seed: Option<u64>,
}

impl NetworkEnvBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 외부 토폴로지를 지정합니다. 지정하지 않으면 설정으로 임의 그래프를 생성합니다.
    pub fn topology(mut self, spec: TopologySpec) -> Self {
        self.topology = Some(spec);
        self
    }

    /// 첫 에피소드 시드를 지정합니다. 설정의 시드보다 우선합니다.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 설정을 검증하고 첫 에피소드가 준비된 환경을 생성합니다.
    pub fn build(self) -> Result<NetworkEnv, EngineError> {
        self.config.validate_settings()?;
        if let Some(spec) = &self.topology {
            spec.validate()?;
        }

        let seed = self
            .seed
            .or(self.config.seed)
            .unwrap_or_else(rand::random);
        let episode = Episode::build(&self.config, self.topology.as_ref(), seed)?;
        let node_count = episode.machines.len();

        let env = NetworkEnv {
            red: RedAgent::new(self.config.red.clone()),
            config: self.config,
            fixed_topology: self.topology,
            topology: episode.topology,
            machines: episode.machines,
            rng: episode.rng,
            seed,
            state: EpisodeState::new(node_count),
        };
        env.announce_reset();
        Ok(env)
    }
}
