//! 블루 팀 액션 인코딩
//!
//! 외부(학습 에이전트)에는 정수 액션 인덱스를 노출하고, 엔진 내부에서는 경계에서 한 번
//! 디코딩한 [`BlueAction`]만 다룹니다.
//!
//! 노드 수가 N일 때:
//!
//! ```text
//! [0, N)          Patch
//! [N, 2N)         Recover
//! 2N              NoOp
//! [2N+1, 3N+1)    Isolate    (격리 활성화 시)
//! [3N+1, 4N+1)    Reconnect  (격리 활성화 시)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use breachsim_core::types::NodeId;

use crate::error::EngineError;

/// 블루 팀 액션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BlueAction {
    /// 취약성 감소
    Patch {
        /// 대상 노드
        node: NodeId,
    },
    /// 리셋 시점 상태로 복구
    Recover {
        /// 대상 노드
        node: NodeId,
    },
    /// 아무것도 하지 않음
    NoOp,
    /// 네트워크에서 격리
    Isolate {
        /// 대상 노드
        node: NodeId,
    },
    /// 격리 해제
    Reconnect {
        /// 대상 노드
        node: NodeId,
    },
}

/// 액션 공간 크기
pub fn action_space_size(node_count: usize, isolation_enabled: bool) -> usize {
    if isolation_enabled {
        4 * node_count + 1
    } else {
        2 * node_count + 1
    }
}

impl BlueAction {
    /// 정수 액션 인덱스를 디코딩합니다.
    pub fn decode(
        index: usize,
        node_count: usize,
        isolation_enabled: bool,
    ) -> Result<Self, EngineError> {
        let size = action_space_size(node_count, isolation_enabled);
        if index >= size {
            return Err(EngineError::ActionOutOfRange { index, size });
        }

        let n = node_count;
        let action = if index < n {
            Self::Patch {
                node: NodeId(index),
            }
        } else if index < 2 * n {
            Self::Recover {
                node: NodeId(index - n),
            }
        } else if index == 2 * n {
            Self::NoOp
        } else if index < 3 * n + 1 {
            Self::Isolate {
                node: NodeId(index - (2 * n + 1)),
            }
        } else {
            Self::Reconnect {
                node: NodeId(index - (3 * n + 1)),
            }
        };
        Ok(action)
    }

    /// 액션을 정수 인덱스로 인코딩합니다.
    pub fn encode(&self, node_count: usize, isolation_enabled: bool) -> Result<usize, EngineError> {
        let n = node_count;
        let index = match *self {
            Self::Patch { node } => node.index(),
            Self::Recover { node } => n + node.index(),
            Self::NoOp => 2 * n,
            Self::Isolate { node } => 2 * n + 1 + node.index(),
            Self::Reconnect { node } => 3 * n + 1 + node.index(),
        };

        let size = action_space_size(node_count, isolation_enabled);
        let node_in_range = self.target().is_none_or(|node| node.index() < n);
        if index >= size || !node_in_range {
            return Err(EngineError::ActionOutOfRange { index, size });
        }
        Ok(index)
    }

    /// 대상 노드 (NoOp이면 `None`)
    pub fn target(&self) -> Option<NodeId> {
        match *self {
            Self::Patch { node }
            | Self::Recover { node }
            | Self::Isolate { node }
            | Self::Reconnect { node } => Some(node),
            Self::NoOp => None,
        }
    }

    /// 메트릭 레이블용 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Patch { .. } => "patch",
            Self::Recover { .. } => "recover",
            Self::NoOp => "noop",
            Self::Isolate { .. } => "isolate",
            Self::Reconnect { .. } => "reconnect",
        }
    }
}

impl fmt::Display for BlueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(node) => write!(f, "{} {}", self.kind(), node),
            None => f.write_str(self.kind()),
        }
    }
}
