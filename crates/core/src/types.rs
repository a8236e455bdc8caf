//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 노드 저장소, 토폴로지, 엔진이 공유하는 데이터 구조를 정의합니다.
//! 노드는 안정적인 정수 인덱스([`NodeId`])로 식별되며, 토폴로지와 관측 인코더가
//! 동일한 순서를 공유합니다.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 노드 식별자
///
/// 에피소드 동안 변하지 않는 아레나 인덱스입니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// 내부 인덱스를 반환합니다.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// 단일 노드(머신)의 상태
///
/// `observed_compromised`는 블루 팀이 인지한 상태로, 탐지가 불완전하면
/// 실제 상태(`true_compromised`)보다 늦게 반영될 수 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    /// 안정적인 노드 UUID (에피소드 RNG로 생성)
    pub uuid: Uuid,
    /// 취약성 점수
    pub vulnerability: f64,
    /// 실제 침해 여부
    pub true_compromised: bool,
    /// 블루 팀이 관측한 침해 여부
    pub observed_compromised: bool,
}

impl NodeState {
    /// 침해되지 않은 새 노드 상태를 생성합니다.
    pub fn new(uuid: Uuid, vulnerability: f64) -> Self {
        Self {
            uuid,
            vulnerability,
            true_compromised: false,
            observed_compromised: false,
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vuln={:.3} compromised={} observed={}",
            self.uuid, self.vulnerability, self.true_compromised, self.observed_compromised,
        )
    }
}

/// 에피소드 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// 침해 노드 수가 패배 임계값에 도달
    Loss,
    /// 블루 팀이 최대 스텝까지 버팀
    StepLimit,
}

impl TerminationReason {
    /// 메트릭 레이블용 고정 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loss => "loss",
            Self::StepLimit => "step_limit",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_ordering_follows_index() {
        assert!(NodeId(0) < NodeId(1));
        assert_eq!(NodeId::from(7).index(), 7);
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(3).to_string(), "node-3");
    }

    #[test]
    fn new_node_state_is_clean() {
        let state = NodeState::new(Uuid::nil(), 0.5);
        assert!(!state.true_compromised);
        assert!(!state.observed_compromised);
        assert!((state.vulnerability - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn termination_reason_names_are_fixed() {
        assert_eq!(TerminationReason::Loss.as_str(), "loss");
        assert_eq!(TerminationReason::StepLimit.to_string(), "step_limit");
    }
}
