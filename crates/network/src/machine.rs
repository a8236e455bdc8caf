//! 노드 상태 저장소
//!
//! [`MachineStore`]는 에피소드의 모든 노드 상태를 인덱스 순서의 아레나로 보관합니다.
//! 리셋 시점의 상태는 스냅샷으로 함께 저장되며, 블루 팀의 복구 액션은 이 스냅샷으로
//! 노드를 되돌립니다.
//!
//! 캐시는 두지 않습니다. 모든 조회는 현재 상태를 직접 읽습니다.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use breachsim_core::config::check_unit_interval;
use breachsim_core::types::{NodeId, NodeState};

use crate::error::NetworkError;

/// 취약성 점수 범위와 패치 스냅 규칙
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityBounds {
    /// 하한
    pub lower: f64,
    /// 상한
    pub upper: f64,
    /// 스냅 시 적용되는 값
    pub floor: f64,
    /// 감소 결과가 이 값보다 작으면 `floor`로 스냅
    pub snap_threshold: f64,
}

impl Default for VulnerabilityBounds {
    fn default() -> Self {
        Self {
            lower: 0.2,
            upper: 0.8,
            floor: 0.2,
            snap_threshold: 0.39,
        }
    }
}

impl VulnerabilityBounds {
    /// 값을 검증하여 범위를 생성합니다.
    pub fn new(
        lower: f64,
        upper: f64,
        floor: f64,
        snap_threshold: f64,
    ) -> Result<Self, NetworkError> {
        let bounds = Self {
            lower,
            upper,
            floor,
            snap_threshold,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// 범위의 일관성을 검증합니다.
    pub fn validate(&self) -> Result<(), NetworkError> {
        let values = [
            ("lower", self.lower),
            ("upper", self.upper),
            ("floor", self.floor),
            ("snap_threshold", self.snap_threshold),
        ];
        for (field, value) in values {
            check_unit_interval(field, value)
                .map_err(|e| NetworkError::InvalidVulnerability(e.to_string()))?;
        }
        if self.lower > self.upper {
            return Err(NetworkError::InvalidVulnerability(format!(
                "lower bound {} exceeds upper bound {}",
                self.lower, self.upper
            )));
        }
        if self.floor < self.lower || self.floor > self.upper {
            return Err(NetworkError::InvalidVulnerability(format!(
                "floor {} outside [{}, {}]",
                self.floor, self.lower, self.upper
            )));
        }
        Ok(())
    }

    /// 값을 `[lower, upper]`로 제한합니다.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    /// 현재 값에서 새 값으로 갱신할 때 실제로 저장될 값을 계산합니다.
    ///
    /// 감소이면서 스냅 임계값 아래로 내려가면 `floor`가 되고, 결과는 항상 범위 안으로 제한됩니다.
    pub fn resolve(&self, current: f64, requested: f64) -> f64 {
        let value = if requested < current && requested < self.snap_threshold {
            self.floor
        } else {
            requested
        };
        self.clamp(value)
    }
}

/// 노드 집합 조회 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeFilter {
    /// 모든 노드
    All,
    /// 실제로 침해된 노드
    TrueCompromised,
    /// 블루 팀이 침해를 인지한 노드
    ObservedCompromised,
    /// 실제로 침해되지 않은 노드
    Uncompromised,
    /// 침해되었지만 아직 탐지되지 않은 노드
    Undetected,
}

impl NodeFilter {
    fn matches(self, state: &NodeState) -> bool {
        match self {
            Self::All => true,
            Self::TrueCompromised => state.true_compromised,
            Self::ObservedCompromised => state.observed_compromised,
            Self::Uncompromised => !state.true_compromised,
            Self::Undetected => state.true_compromised && !state.observed_compromised,
        }
    }
}

/// 에피소드 노드 상태 아레나
#[derive(Debug, Clone)]
pub struct MachineStore {
    nodes: Vec<NodeState>,
    initial: Vec<NodeState>,
    bounds: VulnerabilityBounds,
}

impl MachineStore {
    /// `count`개의 새 노드를 생성합니다.
    ///
    /// UUID와 취약성 점수(`[lower, upper]` 균등 분포)는 모두 주어진 RNG에서 추출되므로
    /// 같은 시드는 같은 저장소를 만듭니다.
    pub fn generate<R: Rng + ?Sized>(
        count: usize,
        bounds: VulnerabilityBounds,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        bounds.validate()?;
        let nodes = (0..count)
            .map(|_| {
                let mut bytes = [0u8; 16];
                rng.fill_bytes(&mut bytes);
                let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
                let vulnerability = rng.gen_range(bounds.lower..=bounds.upper);
                NodeState::new(uuid, vulnerability)
            })
            .collect();
        Ok(Self::with_snapshot(nodes, bounds))
    }

    /// 주어진 상태로 저장소를 만듭니다. 취약성은 범위 안으로 제한됩니다.
    pub fn from_states(
        states: Vec<NodeState>,
        bounds: VulnerabilityBounds,
    ) -> Result<Self, NetworkError> {
        bounds.validate()?;
        let mut nodes = states;
        for node in &mut nodes {
            if !node.vulnerability.is_finite() {
                return Err(NetworkError::InvalidVulnerability(format!(
                    "node {} has non-finite vulnerability",
                    node.uuid
                )));
            }
            node.vulnerability = bounds.clamp(node.vulnerability);
        }
        Ok(Self::with_snapshot(nodes, bounds))
    }

    fn with_snapshot(nodes: Vec<NodeState>, bounds: VulnerabilityBounds) -> Self {
        let initial = nodes.clone();
        Self {
            nodes,
            initial,
            bounds,
        }
    }

    /// 노드 수
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 노드가 하나도 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 취약성 범위
    pub fn bounds(&self) -> &VulnerabilityBounds {
        &self.bounds
    }

    fn check(&self, id: NodeId) -> Result<usize, NetworkError> {
        if id.index() < self.nodes.len() {
            Ok(id.index())
        } else {
            Err(NetworkError::NodeNotFound {
                id,
                node_count: self.nodes.len(),
            })
        }
    }

    /// 노드의 현재 상태를 조회합니다.
    pub fn get(&self, id: NodeId) -> Result<&NodeState, NetworkError> {
        let idx = self.check(id)?;
        Ok(&self.nodes[idx])
    }

    /// 리셋 시점의 노드 상태를 조회합니다.
    pub fn initial(&self, id: NodeId) -> Result<&NodeState, NetworkError> {
        let idx = self.check(id)?;
        Ok(&self.initial[idx])
    }

    /// 취약성 점수를 설정하고 실제로 저장된 값을 반환합니다.
    ///
    /// 감소가 스냅 임계값 아래로 내려가면 하한값으로 스냅됩니다.
    /// 결과는 항상 `[lower, upper]` 안에 있습니다.
    pub fn set_vulnerability(&mut self, id: NodeId, value: f64) -> Result<f64, NetworkError> {
        if !value.is_finite() {
            return Err(NetworkError::InvalidVulnerability(format!(
                "non-finite value {value} for {id}"
            )));
        }
        let idx = self.check(id)?;
        let node = &mut self.nodes[idx];
        let resolved = self.bounds.resolve(node.vulnerability, value);
        debug!(node = %id, from = node.vulnerability, to = resolved, "vulnerability updated");
        node.vulnerability = resolved;
        Ok(resolved)
    }

    /// 실제 침해 플래그를 설정합니다.
    pub fn set_true_compromised(&mut self, id: NodeId, value: bool) -> Result<(), NetworkError> {
        let idx = self.check(id)?;
        self.nodes[idx].true_compromised = value;
        Ok(())
    }

    /// 블루 팀 관측 침해 플래그를 설정합니다.
    pub fn set_observed_compromised(
        &mut self,
        id: NodeId,
        value: bool,
    ) -> Result<(), NetworkError> {
        let idx = self.check(id)?;
        self.nodes[idx].observed_compromised = value;
        Ok(())
    }

    /// 노드를 리셋 시점 스냅샷으로 되돌립니다 (취약성과 두 침해 플래그).
    pub fn reset_to_initial(&mut self, id: NodeId) -> Result<(), NetworkError> {
        let idx = self.check(id)?;
        let snapshot = &self.initial[idx];
        let node = &mut self.nodes[idx];
        node.vulnerability = snapshot.vulnerability;
        node.true_compromised = snapshot.true_compromised;
        node.observed_compromised = snapshot.observed_compromised;
        Ok(())
    }

    /// 조건에 맞는 노드를 인덱스 순서로 반환합니다.
    pub fn filter(&self, filter: NodeFilter) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, state)| filter.matches(state))
            .map(|(id, _)| id)
            .collect()
    }

    /// 조건에 맞는 노드 수
    pub fn count(&self, filter: NodeFilter) -> usize {
        self.nodes.iter().filter(|state| filter.matches(state)).count()
    }

    /// 모든 노드를 인덱스 순서로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeState)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, state)| (NodeId(idx), state))
    }

    /// UUID로 노드를 찾습니다.
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|state| state.uuid == uuid)
            .map(NodeId)
    }
}
