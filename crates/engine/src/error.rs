//! 엔진 에러 타입
//!
//! [`EngineError`]는 액션 해석과 스텝 진행 중 발생하는 에러를 표현합니다.
//! 사용 오류(범위 밖 액션, 종료된 에피소드 진행)는 상태를 바꾸기 전에 반환됩니다.

use breachsim_core::error::{BreachsimError, ConfigError, EpisodeError};
use breachsim_network::NetworkError;

/// 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 액션 인덱스가 액션 공간을 벗어남
    #[error("action {index} out of range (action space size: {size})")]
    ActionOutOfRange {
        /// 요청된 액션 인덱스
        index: usize,
        /// 액션 공간 크기
        size: usize,
    },

    /// 레드 팀이 아직 네트워크에 위치하지 않음
    #[error("red agent has no current position")]
    NoRedPosition,

    /// 이미 종료된 에피소드에 대한 step 호출
    #[error("episode is finished, call reset() first")]
    EpisodeFinished,

    /// 네트워크 상태 에러
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl EngineError {
    pub(crate) fn config(field: &str, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { field, reason } => Self::Config { field, reason },
            other => Self::config("config", other.to_string()),
        }
    }
}

impl From<EngineError> for BreachsimError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ActionOutOfRange { .. } => {
                BreachsimError::Episode(EpisodeError::InvalidAction(err.to_string()))
            }
            EngineError::NoRedPosition | EngineError::EpisodeFinished => {
                BreachsimError::Episode(EpisodeError::InvalidState(err.to_string()))
            }
            EngineError::Network(inner) => inner.into(),
            EngineError::Config { field, reason } => {
                BreachsimError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
