//! 설정 관리 -- breachsim.toml 파싱 및 런타임 설정
//!
//! [`BreachsimConfig`]는 시뮬레이션의 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`BREACHSIM_RED_SKILL=70` 형식)
//! 3. 설정 파일 (`breachsim.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), breachsim_core::error::BreachsimError> {
//! use breachsim_core::config::BreachsimConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = BreachsimConfig::load("breachsim.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = BreachsimConfig::parse("[red]\nskill = 70.0")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BreachsimError, ConfigError};

/// 허용되는 로그 레벨
pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
/// 허용되는 로그 형식
pub const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];
/// 허용되는 진입 노드 선택 정책
pub const VALID_ENTRY_SELECTIONS: [&str; 2] = ["random", "first"];
/// 허용되는 레드 팀 타겟팅 정책
pub const VALID_RED_TARGETING: [&str; 2] = ["random", "most_vulnerable"];

/// 레드 팀 스킬 상한
const MAX_RED_SKILL: f64 = 100.0;

/// breachsim 통합 설정
///
/// `breachsim.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 컴포넌트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreachsimConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 네트워크(토폴로지 생성, 취약성 범위) 설정
    #[serde(default)]
    pub network: NetworkConfig,
    /// 레드 팀(공격자) 설정
    #[serde(default)]
    pub red: RedConfig,
    /// 블루 팀(방어자) 설정
    #[serde(default)]
    pub blue: BlueConfig,
    /// 게임 규칙(종료 조건) 설정
    #[serde(default)]
    pub game: GameConfig,
    /// 보상 가중치 설정
    #[serde(default)]
    pub reward: RewardConfig,
    /// 관측 벡터 설정
    #[serde(default)]
    pub observation: ObservationConfig,
}

impl BreachsimConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BreachsimError> {
        let mut config = Self::read_file(path.as_ref()).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, BreachsimError> {
        let config = Self::read_file(path.as_ref()).await?;
        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Self, BreachsimError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BreachsimError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                BreachsimError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, BreachsimError> {
        toml::from_str(toml_str).map_err(|e| {
            BreachsimError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `BREACHSIM_{SECTION}_{FIELD}`
    /// 예: `BREACHSIM_GAME_MAX_STEPS=200`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "BREACHSIM_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "BREACHSIM_GENERAL_LOG_FORMAT");
        override_opt_u64(&mut self.general.seed, "BREACHSIM_GENERAL_SEED");

        // Network
        override_usize(&mut self.network.node_count, "BREACHSIM_NETWORK_NODE_COUNT");
        override_f64(
            &mut self.network.edge_probability,
            "BREACHSIM_NETWORK_EDGE_PROBABILITY",
        );
        override_f64(
            &mut self.network.vulnerability_lower,
            "BREACHSIM_NETWORK_VULNERABILITY_LOWER",
        );
        override_f64(
            &mut self.network.vulnerability_upper,
            "BREACHSIM_NETWORK_VULNERABILITY_UPPER",
        );
        override_usize(
            &mut self.network.entry_node_count,
            "BREACHSIM_NETWORK_ENTRY_NODE_COUNT",
        );
        override_string(
            &mut self.network.entry_selection,
            "BREACHSIM_NETWORK_ENTRY_SELECTION",
        );

        // Red
        override_f64(&mut self.red.skill, "BREACHSIM_RED_SKILL");
        override_f64(
            &mut self.red.attack_success_threshold,
            "BREACHSIM_RED_ATTACK_SUCCESS_THRESHOLD",
        );
        override_u32(&mut self.red.zero_day_start, "BREACHSIM_RED_ZERO_DAY_START");
        override_u32(
            &mut self.red.exploit_capability_dev,
            "BREACHSIM_RED_EXPLOIT_CAPABILITY_DEV",
        );
        override_bool(&mut self.red.can_move, "BREACHSIM_RED_CAN_MOVE");
        override_string(&mut self.red.targeting, "BREACHSIM_RED_TARGETING");

        // Blue
        override_f64(&mut self.blue.patch_decrement, "BREACHSIM_BLUE_PATCH_DECREMENT");
        override_f64(&mut self.blue.patch_floor, "BREACHSIM_BLUE_PATCH_FLOOR");
        override_f64(
            &mut self.blue.patch_snap_threshold,
            "BREACHSIM_BLUE_PATCH_SNAP_THRESHOLD",
        );
        override_f64(
            &mut self.blue.detection_chance,
            "BREACHSIM_BLUE_DETECTION_CHANCE",
        );
        override_bool(
            &mut self.blue.isolation_enabled,
            "BREACHSIM_BLUE_ISOLATION_ENABLED",
        );

        // Game
        override_usize(
            &mut self.game.loss_compromised_count,
            "BREACHSIM_GAME_LOSS_COMPROMISED_COUNT",
        );
        override_u64(&mut self.game.max_steps, "BREACHSIM_GAME_MAX_STEPS");

        // Reward
        override_f64(
            &mut self.reward.compromise_penalty,
            "BREACHSIM_REWARD_COMPROMISE_PENALTY",
        );
        override_f64(&mut self.reward.patch_reward, "BREACHSIM_REWARD_PATCH_REWARD");
        override_f64(
            &mut self.reward.recover_reward,
            "BREACHSIM_REWARD_RECOVER_REWARD",
        );
        override_f64(&mut self.reward.loss_penalty, "BREACHSIM_REWARD_LOSS_PENALTY");
        override_f64(&mut self.reward.win_reward, "BREACHSIM_REWARD_WIN_REWARD");

        // Observation
        override_bool(
            &mut self.observation.use_true_state,
            "BREACHSIM_OBSERVATION_USE_TRUE_STATE",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), BreachsimError> {
        // general
        check_one_of("general.log_level", &self.general.log_level, &VALID_LOG_LEVELS)?;
        check_one_of(
            "general.log_format",
            &self.general.log_format,
            &VALID_LOG_FORMATS,
        )?;

        // network
        if self.network.node_count == 0 {
            return Err(invalid("network.node_count", "must be greater than 0"));
        }
        check_unit_interval("network.edge_probability", self.network.edge_probability)?;
        check_unit_interval(
            "network.vulnerability_lower",
            self.network.vulnerability_lower,
        )?;
        check_unit_interval(
            "network.vulnerability_upper",
            self.network.vulnerability_upper,
        )?;
        if self.network.vulnerability_lower > self.network.vulnerability_upper {
            return Err(invalid(
                "network.vulnerability_lower",
                "must not exceed network.vulnerability_upper",
            ));
        }
        if self.network.entry_node_count == 0
            || self.network.entry_node_count > self.network.node_count
        {
            return Err(invalid(
                "network.entry_node_count",
                &format!("must be 1-{}", self.network.node_count),
            ));
        }
        check_one_of(
            "network.entry_selection",
            &self.network.entry_selection,
            &VALID_ENTRY_SELECTIONS,
        )?;

        // red
        if !self.red.skill.is_finite() || !(0.0..=MAX_RED_SKILL).contains(&self.red.skill) {
            return Err(invalid(
                "red.skill",
                &format!("must be 0-{MAX_RED_SKILL}"),
            ));
        }
        check_unit_interval(
            "red.attack_success_threshold",
            self.red.attack_success_threshold,
        )?;
        if self.red.exploit_capability_dev == 0 {
            return Err(invalid(
                "red.exploit_capability_dev",
                "must be greater than 0",
            ));
        }
        check_one_of("red.targeting", &self.red.targeting, &VALID_RED_TARGETING)?;

        // blue
        check_unit_interval("blue.patch_decrement", self.blue.patch_decrement)?;
        check_unit_interval("blue.patch_snap_threshold", self.blue.patch_snap_threshold)?;
        check_unit_interval("blue.detection_chance", self.blue.detection_chance)?;
        if !(self.network.vulnerability_lower..=self.network.vulnerability_upper)
            .contains(&self.blue.patch_floor)
        {
            return Err(invalid(
                "blue.patch_floor",
                "must lie within the vulnerability bounds",
            ));
        }

        // game
        if self.game.loss_compromised_count == 0
            || self.game.loss_compromised_count > self.network.node_count
        {
            return Err(invalid(
                "game.loss_compromised_count",
                &format!("must be 1-{}", self.network.node_count),
            ));
        }

        // reward
        let weights = [
            ("reward.compromise_penalty", self.reward.compromise_penalty),
            ("reward.patch_reward", self.reward.patch_reward),
            ("reward.recover_reward", self.reward.recover_reward),
            ("reward.loss_penalty", self.reward.loss_penalty),
            ("reward.win_reward", self.reward.win_reward),
        ];
        for (field, value) in weights {
            if !value.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> BreachsimError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
    .into()
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), BreachsimError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field,
            &format!("must be one of: {}", allowed.join(", ")),
        ))
    }
}

/// 값이 유한하고 `[0, 1]` 안에 있는지 검증합니다.
///
/// 엔진/네트워크 측 검증도 같은 규칙을 쓰도록 공개합니다.
pub fn check_unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: "must be within [0, 1]".to_owned(),
        })
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 첫 에피소드 시드 (없으면 엔트로피에서 추출)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            seed: None,
        }
    }
}

/// 네트워크 설정
///
/// 토폴로지 생성기와 노드 저장소의 취약성 범위를 정의합니다.
/// 외부에서 토폴로지를 직접 주입하는 경우 `node_count`와 `edge_probability`는
/// 사용되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// 생성할 노드 수
    pub node_count: usize,
    /// 임의 그래프 생성 시 간선 확률
    pub edge_probability: f64,
    /// 취약성 점수 하한
    pub vulnerability_lower: f64,
    /// 취약성 점수 상한
    pub vulnerability_upper: f64,
    /// 진입 노드 수
    pub entry_node_count: usize,
    /// 진입 노드 선택 정책 (random, first)
    pub entry_selection: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 10,
            edge_probability: 0.3,
            vulnerability_lower: 0.2,
            vulnerability_upper: 0.8,
            entry_node_count: 2,
            entry_selection: "random".to_owned(),
        }
    }
}

/// 레드 팀 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedConfig {
    /// 공격 스킬 (0-100)
    pub skill: f64,
    /// 기본 공격 성공 임계값 (0-1)
    pub attack_success_threshold: f64,
    /// 시작 시 보유한 제로데이 수
    pub zero_day_start: u32,
    /// 제로데이 하나를 개발하는 데 필요한 기본 공격 횟수
    pub exploit_capability_dev: u32,
    /// 침해 노드 간 이동 가능 여부
    pub can_move: bool,
    /// 타겟 선택 정책 (random, most_vulnerable)
    pub targeting: String,
}

impl Default for RedConfig {
    fn default() -> Self {
        Self {
            skill: 50.0,
            attack_success_threshold: 0.2,
            zero_day_start: 1,
            exploit_capability_dev: 4,
            can_move: false,
            targeting: "random".to_owned(),
        }
    }
}

/// 블루 팀 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueConfig {
    /// 패치 1회당 취약성 감소량
    pub patch_decrement: f64,
    /// 스냅 시 적용되는 취약성 하한값
    pub patch_floor: f64,
    /// 감소 결과가 이 값보다 작으면 `patch_floor`로 스냅
    pub patch_snap_threshold: f64,
    /// 침해 발생 시 블루 팀이 이를 탐지할 확률 (0-1)
    pub detection_chance: f64,
    /// 격리/재연결 액션 활성화 여부
    pub isolation_enabled: bool,
}

impl Default for BlueConfig {
    fn default() -> Self {
        Self {
            patch_decrement: 0.2,
            patch_floor: 0.2,
            patch_snap_threshold: 0.39,
            detection_chance: 1.0,
            isolation_enabled: false,
        }
    }
}

/// 게임 규칙 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// 이 수만큼 노드가 침해되면 블루 팀 패배
    pub loss_compromised_count: usize,
    /// 에피소드 최대 스텝 수 (0이면 제한 없음)
    pub max_steps: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            loss_compromised_count: 5,
            max_steps: 500,
        }
    }
}

/// 보상 가중치 설정
///
/// 모든 값은 크기(magnitude)이며, 페널티 항목은 보상에서 차감됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// 새로 침해된 노드 1개당 페널티
    pub compromise_penalty: f64,
    /// 유효한 패치 1회당 보상
    pub patch_reward: f64,
    /// 침해 노드 복구 1회당 보상
    pub recover_reward: f64,
    /// 패배 시 페널티
    pub loss_penalty: f64,
    /// 최대 스텝까지 버텼을 때의 보상
    pub win_reward: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            compromise_penalty: 1.0,
            patch_reward: 0.0,
            recover_reward: 0.5,
            loss_penalty: 100.0,
            win_reward: 100.0,
        }
    }
}

/// 관측 벡터 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationConfig {
    /// `true`면 실제 침해 상태를, `false`면 블루 팀 관측 상태를 인코딩
    pub use_true_state: bool,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_opt_u64(target: &mut Option<u64>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_f64(target: &mut f64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<f64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}
