//! 네트워크 토폴로지
//!
//! [`Topology`]는 에피소드 동안 변하지 않는 기반 그래프(`petgraph::graph::UnGraph`)와
//! 그 위에 얹힌 노드별 격리 마스크로 구성됩니다. 격리된 노드는 모든 인접 조회에서
//! 제외되며, 재연결하면 원래 간선 집합이 그대로 복원됩니다.
//!
//! 진입 노드 집합은 리셋 시점에 [`EntrySelection`] 정책으로 선택되고 에피소드 동안 고정됩니다.

use std::collections::BTreeSet;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use breachsim_core::types::NodeId;

use crate::error::NetworkError;
use crate::machine::MachineStore;

/// 진입 노드 선택 정책
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum EntrySelection {
    /// 명시적 노드 목록
    Explicit {
        /// 진입 노드 인덱스
        nodes: Vec<NodeId>,
    },
    /// 리셋마다 임의로 `count`개 선택
    Random {
        /// 선택할 노드 수
        count: usize,
    },
    /// 인덱스 순서로 앞에서 `count`개 선택
    First {
        /// 선택할 노드 수
        count: usize,
    },
}

impl EntrySelection {
    /// 설정 문자열(`random`, `first`)과 개수로 정책을 만듭니다.
    pub fn from_policy(policy: &str, count: usize) -> Result<Self, NetworkError> {
        match policy {
            "random" => Ok(Self::Random { count }),
            "first" => Ok(Self::First { count }),
            other => Err(NetworkError::EntrySelection(format!(
                "unknown policy '{other}'"
            ))),
        }
    }

    /// 노드 `node_count`개 그래프에서 진입 노드를 선택합니다.
    pub fn select<R: Rng + ?Sized>(
        &self,
        node_count: usize,
        rng: &mut R,
    ) -> Result<BTreeSet<NodeId>, NetworkError> {
        let check_count = |count: usize| {
            if count == 0 || count > node_count {
                Err(NetworkError::EntrySelection(format!(
                    "count must be 1-{node_count}, got {count}"
                )))
            } else {
                Ok(count)
            }
        };

        match self {
            Self::Explicit { nodes } => {
                if nodes.is_empty() {
                    return Err(NetworkError::EntrySelection(
                        "explicit list is empty".to_owned(),
                    ));
                }
                if let Some(bad) = nodes.iter().find(|id| id.index() >= node_count) {
                    return Err(NetworkError::NodeNotFound {
                        id: *bad,
                        node_count,
                    });
                }
                Ok(nodes.iter().copied().collect())
            }
            Self::Random { count } => {
                let count = check_count(*count)?;
                Ok(rand::seq::index::sample(rng, node_count, count)
                    .into_iter()
                    .map(NodeId)
                    .collect())
            }
            Self::First { count } => {
                let count = check_count(*count)?;
                Ok((0..count).map(NodeId).collect())
            }
        }
    }
}

/// 외부에서 주입하는 토폴로지 명세
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySpec {
    /// 노드 수
    pub node_count: usize,
    /// 무방향 간선 목록 (노드 인덱스 쌍)
    pub edges: Vec<(usize, usize)>,
    /// 진입 노드 선택 정책
    pub entry_nodes: EntrySelection,
}

impl TopologySpec {
    /// 간선과 노드 수를 검증합니다.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.node_count == 0 {
            return Err(NetworkError::InvalidTopology(
                "at least one node is required".to_owned(),
            ));
        }
        for &(a, b) in &self.edges {
            if a >= self.node_count || b >= self.node_count {
                return Err(NetworkError::InvalidEdge {
                    a,
                    b,
                    reason: format!("endpoint out of range (node count: {})", self.node_count),
                });
            }
            if a == b {
                return Err(NetworkError::InvalidEdge {
                    a,
                    b,
                    reason: "self loop".to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// 에피소드 토폴로지
#[derive(Debug, Clone)]
pub struct Topology {
    graph: UnGraph<(), ()>,
    isolated: Vec<bool>,
    entry: BTreeSet<NodeId>,
}

impl Topology {
    /// 명세로부터 토폴로지를 만들고 진입 노드를 선택합니다.
    pub fn from_spec<R: Rng + ?Sized>(
        spec: &TopologySpec,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        spec.validate()?;

        let mut graph: UnGraph<(), ()> =
            UnGraph::with_capacity(spec.node_count, spec.edges.len());
        for _ in 0..spec.node_count {
            graph.add_node(());
        }
        for &(a, b) in &spec.edges {
            graph.update_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }

        let entry = spec.entry_nodes.select(spec.node_count, rng)?;
        debug!(
            nodes = spec.node_count,
            edges = graph.edge_count(),
            entry = ?entry,
            "topology built"
        );

        Ok(Self {
            graph,
            isolated: vec![false; spec.node_count],
            entry,
        })
    }

    /// 격리 마스크를 모두 해제하고 진입 노드를 다시 선택합니다.
    ///
    /// 간선 집합은 그대로 유지됩니다.
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        entry_nodes: &EntrySelection,
        rng: &mut R,
    ) -> Result<(), NetworkError> {
        self.entry = entry_nodes.select(self.node_count(), rng)?;
        self.isolated.iter_mut().for_each(|flag| *flag = false);
        Ok(())
    }

    /// 노드 수
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// 기반 그래프의 간선 수 (격리 무시)
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn check(&self, id: NodeId) -> Result<NodeIndex, NetworkError> {
        if id.index() < self.graph.node_count() {
            Ok(NodeIndex::new(id.index()))
        } else {
            Err(NetworkError::NodeNotFound {
                id,
                node_count: self.graph.node_count(),
            })
        }
    }

    /// 모든 노드를 인덱스 순서로 반환합니다.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        (0..self.graph.node_count()).map(NodeId).collect()
    }

    /// 격리를 반영한 이웃 노드 집합
    ///
    /// 노드 자신이 격리되어 있거나 이웃이 격리되어 있으면 그 간선은 끊어진 것으로 봅니다.
    pub fn linked_nodes(&self, id: NodeId) -> Result<BTreeSet<NodeId>, NetworkError> {
        let idx = self.check(id)?;
        if self.isolated[idx.index()] {
            return Ok(BTreeSet::new());
        }
        Ok(self
            .graph
            .neighbors(idx)
            .filter(|n| !self.isolated[n.index()])
            .map(|n| NodeId(n.index()))
            .collect())
    }

    /// 이웃 노드를 (미침해, 침해)로 나눕니다.
    pub fn split_by_compromise(
        &self,
        id: NodeId,
        store: &MachineStore,
    ) -> Result<(BTreeSet<NodeId>, BTreeSet<NodeId>), NetworkError> {
        let mut clean = BTreeSet::new();
        let mut compromised = BTreeSet::new();
        for neighbour in self.linked_nodes(id)? {
            if store.get(neighbour)?.true_compromised {
                compromised.insert(neighbour);
            } else {
                clean.insert(neighbour);
            }
        }
        Ok((clean, compromised))
    }

    /// 진입 노드 집합
    pub fn entry_nodes(&self) -> &BTreeSet<NodeId> {
        &self.entry
    }

    /// 격리되지 않은 진입 노드 집합
    pub fn reachable_entry_nodes(&self) -> BTreeSet<NodeId> {
        self.entry
            .iter()
            .copied()
            .filter(|id| !self.isolated[id.index()])
            .collect()
    }

    /// 진입 노드 여부
    pub fn is_entry(&self, id: NodeId) -> bool {
        self.entry.contains(&id)
    }

    /// 노드를 격리합니다. 상태가 바뀌었으면 `true`를 반환합니다.
    pub fn isolate(&mut self, id: NodeId) -> Result<bool, NetworkError> {
        let idx = self.check(id)?.index();
        let changed = !self.isolated[idx];
        self.isolated[idx] = true;
        Ok(changed)
    }

    /// 격리를 해제합니다. 상태가 바뀌었으면 `true`를 반환합니다.
    pub fn reconnect(&mut self, id: NodeId) -> Result<bool, NetworkError> {
        let idx = self.check(id)?.index();
        let changed = self.isolated[idx];
        self.isolated[idx] = false;
        Ok(changed)
    }

    /// 격리 여부
    pub fn is_isolated(&self, id: NodeId) -> Result<bool, NetworkError> {
        let idx = self.check(id)?.index();
        Ok(self.isolated[idx])
    }

    /// 격리된 노드 목록 (인덱스 순서)
    pub fn isolated_nodes(&self) -> Vec<NodeId> {
        self.isolated
            .iter()
            .enumerate()
            .filter(|(_, isolated)| **isolated)
            .map(|(idx, _)| NodeId(idx))
            .collect()
    }

    /// 기반 그래프의 간선 목록 (작은 인덱스가 앞, 정렬됨)
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                let (a, b) = (e.source().index(), e.target().index());
                (NodeId(a.min(b)), NodeId(a.max(b)))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// 격리를 반영한 현재 유효 간선 목록
    pub fn active_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.edges()
            .into_iter()
            .filter(|(a, b)| !self.isolated[a.index()] && !self.isolated[b.index()])
            .collect()
    }

    /// 노드의 기반 그래프 차수 (격리 무시)
    pub fn degree(&self, id: NodeId) -> Result<usize, NetworkError> {
        let idx = self.check(id)?;
        Ok(self.graph.neighbors(idx).count())
    }
}
