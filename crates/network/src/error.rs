//! 네트워크 에러 타입
//!
//! [`NetworkError`]는 노드 저장소와 토폴로지에서 발생하는 모든 에러를 표현합니다.
//! `From<NetworkError> for BreachsimError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use breachsim_core::error::{BreachsimError, TopologyError};
use breachsim_core::types::NodeId;

/// 네트워크 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// 존재하지 않는 노드
    #[error("node {id} not found (node count: {node_count})")]
    NodeNotFound {
        /// 요청된 노드
        id: NodeId,
        /// 현재 노드 수
        node_count: usize,
    },

    /// 잘못된 간선
    #[error("invalid edge ({a}, {b}): {reason}")]
    InvalidEdge {
        /// 한쪽 끝점 인덱스
        a: usize,
        /// 다른 끝점 인덱스
        b: usize,
        /// 사유
        reason: String,
    },

    /// 잘못된 토폴로지 구성
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// 진입 노드 선택 실패
    #[error("invalid entry node selection: {0}")]
    EntrySelection(String),

    /// 취약성 값 또는 범위가 유효하지 않음
    #[error("invalid vulnerability: {0}")]
    InvalidVulnerability(String),
}

impl From<NetworkError> for BreachsimError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::NodeNotFound { id, .. } => {
                BreachsimError::Topology(TopologyError::NodeNotFound(id.index()))
            }
            other => BreachsimError::Topology(TopologyError::Invalid(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_not_found_display() {
        let err = NetworkError::NodeNotFound {
            id: NodeId(12),
            node_count: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("node-12"));
        assert!(msg.contains("5"));
    }

    #[test]
    fn invalid_edge_display() {
        let err = NetworkError::InvalidEdge {
            a: 3,
            b: 3,
            reason: "self loop".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid edge (3, 3): self loop");
    }

    #[test]
    fn node_not_found_converts_to_topology_error() {
        let err: BreachsimError = NetworkError::NodeNotFound {
            id: NodeId(4),
            node_count: 2,
        }
        .into();
        assert!(matches!(
            err,
            BreachsimError::Topology(TopologyError::NodeNotFound(4))
        ));
    }

    #[test]
    fn other_errors_convert_to_invalid_topology() {
        let err: BreachsimError = NetworkError::EntrySelection("empty".to_owned()).into();
        match err {
            BreachsimError::Topology(TopologyError::Invalid(msg)) => {
                assert!(msg.contains("empty"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
