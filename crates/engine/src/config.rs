//! 엔진 설정
//!
//! [`EngineConfig`]는 core의 [`BreachsimConfig`](breachsim_core::config::BreachsimConfig)에서
//! 파생되며, 문자열로 검증된 값을 엔진 내부의 타입(열거형, 범위 구조체)으로 변환합니다.
//!
//! # 사용 예시
//! ```ignore
//! use breachsim_core::config::{BreachsimConfig, check_unit_interval};
//! use breachsim_engine::config::EngineConfig;
//!
//! let core_config = BreachsimConfig::default();
//! let config = EngineConfig::from_core(&core_config)?;
//! ```

use serde::{Deserialize, Serialize};

use breachsim_core::config::{check_unit_interval, BreachsimConfig};
use breachsim_network::{EntrySelection, VulnerabilityBounds};

use crate::error::EngineError;
use crate::reward::RewardWeights;

/// 레드 팀 스킬 상한
const MAX_RED_SKILL: f64 = 100.0;

/// 레드 팀 타겟 선택 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Targeting {
    /// 후보 중 임의 선택 (시드 RNG)
    #[default]
    Random,
    /// 취약성이 가장 높은 노드 (동점이면 낮은 인덱스)
    MostVulnerable,
}

impl Targeting {
    /// 설정 문자열을 변환합니다.
    pub fn from_config(value: &str) -> Result<Self, EngineError> {
        match value {
            "random" => Ok(Self::Random),
            "most_vulnerable" => Ok(Self::MostVulnerable),
            other => Err(EngineError::config(
                "red.targeting",
                format!("unknown targeting policy '{other}'"),
            )),
        }
    }
}

/// 레드 팀 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedSettings {
    /// 공격 스킬 (0-100)
    pub skill: f64,
    /// 기본 공격 성공 임계값
    pub attack_success_threshold: f64,
    /// 시작 시 보유 제로데이 수
    pub zero_day_start: u32,
    /// 제로데이 1개 개발에 필요한 기본 공격 횟수
    pub exploit_capability_dev: u32,
    /// 침해 노드 간 이동 가능 여부
    pub can_move: bool,
    /// 타겟 선택 정책
    pub targeting: Targeting,
}

impl Default for RedSettings {
    fn default() -> Self {
        Self {
            skill: 50.0,
            attack_success_threshold: 0.2,
            zero_day_start: 1,
            exploit_capability_dev: 4,
            can_move: false,
            targeting: Targeting::Random,
        }
    }
}

/// 블루 팀 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueSettings {
    /// 패치 1회당 취약성 감소량
    pub patch_decrement: f64,
    /// 침해 탐지 확률
    pub detection_chance: f64,
    /// 격리/재연결 액션 활성화 여부
    pub isolation_enabled: bool,
}

impl Default for BlueSettings {
    fn default() -> Self {
        Self {
            patch_decrement: 0.2,
            detection_chance: 1.0,
            isolation_enabled: false,
        }
    }
}

/// 엔진 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 생성할 노드 수 (외부 토폴로지를 쓰면 무시)
    pub node_count: usize,
    /// 임의 그래프 간선 확률 (외부 토폴로지를 쓰면 무시)
    pub edge_probability: f64,
    /// 생성 토폴로지의 진입 노드 선택 정책
    pub entry_selection: EntrySelection,
    /// 취약성 범위와 패치 스냅 규칙
    pub bounds: VulnerabilityBounds,
    /// 레드 팀 설정
    pub red: RedSettings,
    /// 블루 팀 설정
    pub blue: BlueSettings,
    /// 패배 판정 침해 노드 수
    pub loss_compromised_count: usize,
    /// 최대 스텝 수 (0이면 제한 없음)
    pub max_steps: u64,
    /// 보상 가중치
    pub reward: RewardWeights,
    /// 관측 벡터에 실제 침해 상태를 쓸지 여부
    pub use_true_state: bool,
    /// 첫 에피소드 시드
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_count: 10,
            edge_probability: 0.3,
            entry_selection: EntrySelection::Random { count: 2 },
            bounds: VulnerabilityBounds::default(),
            red: RedSettings::default(),
            blue: BlueSettings::default(),
            loss_compromised_count: 5,
            max_steps: 500,
            reward: RewardWeights::default(),
            use_true_state: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// core 설정에서 엔진 설정을 생성합니다.
    ///
    /// 문자열 정책 값을 열거형으로 바꾸고 결과를 검증합니다.
    pub fn from_core(core: &BreachsimConfig) -> Result<Self, EngineError> {
        let entry_selection = EntrySelection::from_policy(
            &core.network.entry_selection,
            core.network.entry_node_count,
        )?;
        let config = Self {
            node_count: core.network.node_count,
            edge_probability: core.network.edge_probability,
            entry_selection,
            bounds: VulnerabilityBounds {
                lower: core.network.vulnerability_lower,
                upper: core.network.vulnerability_upper,
                floor: core.blue.patch_floor,
                snap_threshold: core.blue.patch_snap_threshold,
            },
            red: RedSettings {
                skill: core.red.skill,
                attack_success_threshold: core.red.attack_success_threshold,
                zero_day_start: core.red.zero_day_start,
                exploit_capability_dev: core.red.exploit_capability_dev,
                can_move: core.red.can_move,
                targeting: Targeting::from_config(&core.red.targeting)?,
            },
            blue: BlueSettings {
                patch_decrement: core.blue.patch_decrement,
                detection_chance: core.blue.detection_chance,
                isolation_enabled: core.blue.isolation_enabled,
            },
            loss_compromised_count: core.game.loss_compromised_count,
            max_steps: core.game.max_steps,
            reward: RewardWeights::from_core(&core.reward),
            use_true_state: core.observation.use_true_state,
            seed: core.general.seed,
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.validate_settings()?;
        self.validate_for_nodes(self.node_count)
    }

    /// 노드 수와 무관한 설정값을 검증합니다.
    pub fn validate_settings(&self) -> Result<(), EngineError> {
        if self.node_count == 0 {
            return Err(EngineError::config("node_count", "must be greater than 0"));
        }
        check_unit_interval("edge_probability", self.edge_probability)?;
        self.bounds.validate()?;

        if !self.red.skill.is_finite() || !(0.0..=MAX_RED_SKILL).contains(&self.red.skill) {
            return Err(EngineError::config(
                "red.skill",
                format!("must be 0-{MAX_RED_SKILL}"),
            ));
        }
        check_unit_interval("red.attack_success_threshold", self.red.attack_success_threshold)?;
        if self.red.exploit_capability_dev == 0 {
            return Err(EngineError::config(
                "red.exploit_capability_dev",
                "must be greater than 0",
            ));
        }

        check_unit_interval("blue.patch_decrement", self.blue.patch_decrement)?;
        check_unit_interval("blue.detection_chance", self.blue.detection_chance)?;

        self.reward.validate()
    }

    /// 실제 토폴로지 노드 수에 대해 노드 수 의존 설정을 검증합니다.
    pub fn validate_for_nodes(&self, node_count: usize) -> Result<(), EngineError> {
        if self.loss_compromised_count == 0 || self.loss_compromised_count > node_count {
            return Err(EngineError::config(
                "loss_compromised_count",
                format!("must be 1-{node_count}"),
            ));
        }
        Ok(())
    }
}

/// 엔진 설정 빌더
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 노드 수를 설정합니다.
    pub fn node_count(mut self, count: usize) -> Self {
        self.config.node_count = count;
        self
    }

    /// 임의 그래프 간선 확률을 설정합니다.
    pub fn edge_probability(mut self, p: f64) -> Self {
        self.config.edge_probability = p;
        self
    }

    /// 진입 노드 선택 정책을 설정합니다.
    pub fn entry_selection(mut self, selection: EntrySelection) -> Self {
        self.config.entry_selection = selection;
        self
    }

    /// 취약성 범위를 설정합니다.
    pub fn bounds(mut self, bounds: VulnerabilityBounds) -> Self {
        self.config.bounds = bounds;
        self
    }

    /// 레드 팀 설정을 교체합니다.
    pub fn red(mut self, red: RedSettings) -> Self {
        self.config.red = red;
        self
    }

    /// 블루 팀 설정을 교체합니다.
    pub fn blue(mut self, blue: BlueSettings) -> Self {
        self.config.blue = blue;
        self
    }

    /// 레드 팀 스킬과 공격 임계값을 설정합니다.
    pub fn attack(mut self, skill: f64, threshold: f64) -> Self {
        self.config.red.skill = skill;
        self.config.red.attack_success_threshold = threshold;
        self
    }

    /// 레드 팀 이동 가능 여부를 설정합니다.
    pub fn red_can_move(mut self, can_move: bool) -> Self {
        self.config.red.can_move = can_move;
        self
    }

    /// 격리 액션 활성화 여부를 설정합니다.
    pub fn isolation_enabled(mut self, enabled: bool) -> Self {
        self.config.blue.isolation_enabled = enabled;
        self
    }

    /// 패배 판정 침해 노드 수를 설정합니다.
    pub fn loss_compromised_count(mut self, count: usize) -> Self {
        self.config.loss_compromised_count = count;
        self
    }

    /// 최대 스텝 수를 설정합니다 (0이면 제한 없음).
    pub fn max_steps(mut self, steps: u64) -> Self {
        self.config.max_steps = steps;
        self
    }

    /// 보상 가중치를 설정합니다.
    pub fn reward(mut self, weights: RewardWeights) -> Self {
        self.config.reward = weights;
        self
    }

    /// 관측 벡터에 실제 침해 상태를 쓸지 설정합니다.
    pub fn use_true_state(mut self, enabled: bool) -> Self {
        self.config.use_true_state = enabled;
        self
    }

    /// 첫 에피소드 시드를 설정합니다.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// 설정을 검증하고 `EngineConfig`를 생성합니다.
    pub fn build(self) -> Result<EngineConfig, EngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_converts_policies() {
        let mut core = BreachsimConfig::default();
        core.red.targeting = "most_vulnerable".to_owned();
        core.network.entry_selection = "first".to_owned();
        core.network.entry_node_count = 3;
        core.general.seed = Some(11);

        let config = EngineConfig::from_core(&core).unwrap();
        assert_eq!(config.red.targeting, Targeting::MostVulnerable);
        assert_eq!(config.entry_selection, EntrySelection::First { count: 3 });
        assert_eq!(config.seed, Some(11));
        assert!((config.bounds.snap_threshold - 0.39).abs() < f64::EPSILON);
    }

    #[test]
    fn from_core_matches_engine_defaults() {
        let config = EngineConfig::from_core(&BreachsimConfig::default()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn from_core_rejects_unknown_targeting() {
        let mut core = BreachsimConfig::default();
        core.red.targeting = "nearest".to_owned();
        let err = EngineConfig::from_core(&core).unwrap_err();
        assert!(err.to_string().contains("red.targeting"));
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let config = EngineConfig {
            bounds: VulnerabilityBounds {
                lower: 0.9,
                upper: 0.1,
                floor: 0.5,
                snap_threshold: 0.39,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::Network(_))
        ));
    }

    #[test]
    fn builder_rejects_snap_threshold_outside_unit_interval() {
        let result = EngineConfigBuilder::new()
            .bounds(VulnerabilityBounds {
                snap_threshold: 5.0,
                ..Default::default()
            })
            .build();
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::Network(_)));
        assert!(err.to_string().contains("snap_threshold"));
    }

    #[test]
    fn validate_rejects_threshold_outside_unit_interval() {
        let result = EngineConfigBuilder::new().attack(50.0, 1.2).build();
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_zero_nodes() {
        assert!(EngineConfigBuilder::new().node_count(0).build().is_err());
    }

    #[test]
    fn validate_rejects_unreachable_loss_threshold() {
        let result = EngineConfigBuilder::new()
            .node_count(4)
            .loss_compromised_count(5)
            .build();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("loss_compromised_count"));
    }

    #[test]
    fn builder_sets_fields() {
        let config = EngineConfigBuilder::new()
            .node_count(6)
            .red_can_move(true)
            .isolation_enabled(true)
            .max_steps(0)
            .seed(3)
            .build()
            .unwrap();
        assert_eq!(config.node_count, 6);
        assert!(config.red.can_move);
        assert!(config.blue.isolation_enabled);
        assert_eq!(config.max_steps, 0);
        assert_eq!(config.seed, Some(3));
    }
}
