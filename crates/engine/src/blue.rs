//! 블루 팀 액션 해석
//!
//! 디코딩된 [`BlueAction`]을 노드 저장소와 토폴로지에 적용합니다.
//! 침해 탐지는 블루 팀의 센서로, 레드 턴이 끝난 뒤 아직 탐지되지 않은 침해 노드마다
//! 한 번씩 판정합니다.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use breachsim_core::types::NodeId;
use breachsim_network::{MachineStore, NodeFilter, Topology};

use crate::action::BlueAction;
use crate::config::BlueSettings;
use crate::error::EngineError;

/// 블루 액션 적용 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlueEffect {
    /// 적용한 액션
    pub action: BlueAction,
    /// 노드 상태나 격리 마스크가 바뀌었는지 여부
    pub changed: bool,
    /// 취약성을 실제로 낮춘 패치인지 여부
    pub effective_patch: bool,
    /// 실제로 침해된 노드를 복구했는지 여부
    pub recovered_compromised: bool,
}

impl BlueEffect {
    fn unchanged(action: BlueAction) -> Self {
        Self {
            action,
            changed: false,
            effective_patch: false,
            recovered_compromised: false,
        }
    }
}

/// 블루 액션을 적용합니다.
///
/// 침해된 노드에 대한 패치는 아무것도 바꾸지 않습니다.
pub fn apply(
    action: BlueAction,
    settings: &BlueSettings,
    topology: &mut Topology,
    store: &mut MachineStore,
) -> Result<BlueEffect, EngineError> {
    let effect = match action {
        BlueAction::NoOp => BlueEffect::unchanged(action),
        BlueAction::Patch { node } => {
            let state = store.get(node)?;
            if state.true_compromised {
                debug!(node = %node, "patch skipped on compromised node");
                BlueEffect::unchanged(action)
            } else {
                let before = state.vulnerability;
                let after = store.set_vulnerability(node, before - settings.patch_decrement)?;
                let lowered = after < before;
                BlueEffect {
                    action,
                    changed: lowered,
                    effective_patch: lowered,
                    recovered_compromised: false,
                }
            }
        }
        BlueAction::Recover { node } => {
            let before = store.get(node)?.clone();
            store.reset_to_initial(node)?;
            let changed = store.get(node)? != &before;
            BlueEffect {
                action,
                changed,
                effective_patch: false,
                recovered_compromised: before.true_compromised,
            }
        }
        BlueAction::Isolate { node } => BlueEffect {
            changed: topology.isolate(node)?,
            ..BlueEffect::unchanged(action)
        },
        BlueAction::Reconnect { node } => BlueEffect {
            changed: topology.reconnect(node)?,
            ..BlueEffect::unchanged(action)
        },
    };

    debug!(action = %action, changed = effect.changed, "blue action applied");
    Ok(effect)
}

/// 탐지되지 않은 침해 노드마다 `chance` 확률로 탐지를 판정하고, 새로 탐지된 노드를 반환합니다.
pub fn detect_compromises<R: Rng + ?Sized>(
    store: &mut MachineStore,
    chance: f64,
    rng: &mut R,
) -> Result<Vec<NodeId>, EngineError> {
    let mut detected = Vec::new();
    for node in store.filter(NodeFilter::Undetected) {
        if chance >= 1.0 || rng.gen_bool(chance) {
            store.set_observed_compromised(node, true)?;
            detected.push(node);
        }
    }
    if !detected.is_empty() {
        debug!(nodes = ?detected, "compromises detected");
    }
    Ok(detected)
}
