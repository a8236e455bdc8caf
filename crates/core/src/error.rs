//! 에러 타입 -- 도메인별 에러 정의
//!
//! 각 크레이트는 자기 도메인 에러(`NetworkError`, `EngineError` 등)를 정의하고
//! `From<...> for BreachsimError`를 구현하여 상위 레이어로 `?` 전파합니다.

/// breachsim 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum BreachsimError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 토폴로지/노드 저장소 에러
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    /// 에피소드 진행(step/reset) 에러
    #[error("episode error: {0}")]
    Episode(#[from] EpisodeError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 토폴로지 에러
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// 존재하지 않는 노드
    #[error("node not found: {0}")]
    NodeNotFound(usize),

    /// 잘못된 그래프 구성 (간선, 진입 노드 등)
    #[error("invalid topology: {0}")]
    Invalid(String),
}

/// 에피소드 진행 에러
#[derive(Debug, thiserror::Error)]
pub enum EpisodeError {
    /// 액션 인덱스가 액션 공간을 벗어남
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// 현재 상태에서 허용되지 않는 호출
    #[error("invalid state: {0}")]
    InvalidState(String),
}
