//! 관측 벡터 인코딩
//!
//! 노드마다 `[취약성, 침해 표시]` 두 값을 인덱스 순서로 이어 붙인 `2N` 길이 벡터를 만듭니다.
//! 침해 표시는 설정에 따라 실제 상태 또는 블루 팀 관측 상태를 사용합니다.

use breachsim_network::MachineStore;

/// 노드당 관측 필드 수
pub const FIELDS_PER_NODE: usize = 2;

/// 관측 벡터 길이
pub fn observation_size(node_count: usize) -> usize {
    node_count * FIELDS_PER_NODE
}

/// 노드별 `[취약성, 침해 표시]` 목록
pub fn machine_states(store: &MachineStore, use_true_state: bool) -> Vec<[f64; FIELDS_PER_NODE]> {
    store
        .iter()
        .map(|(_, state)| {
            let compromised = if use_true_state {
                state.true_compromised
            } else {
                state.observed_compromised
            };
            [state.vulnerability, if compromised { 1.0 } else { 0.0 }]
        })
        .collect()
}

/// 평탄화된 관측 벡터
pub fn encode(store: &MachineStore, use_true_state: bool) -> Vec<f64> {
    machine_states(store, use_true_state)
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use breachsim_core::types::{NodeId, NodeState};
    use breachsim_network::VulnerabilityBounds;

    fn states(vulns: &[f64]) -> MachineStore {
        let nodes = vulns
            .iter()
            .map(|v| NodeState::new(Default::default(), *v))
            .collect();
        MachineStore::from_states(nodes, VulnerabilityBounds::default()).unwrap()
    }

    #[test]
    fn size_is_two_per_node() {
        assert_eq!(observation_size(7), 14);
        let store = states(&[0.3, 0.4, 0.5]);
        assert_eq!(encode(&store, false).len(), observation_size(3));
    }

    #[test]
    fn encodes_in_index_order() {
        let mut store = states(&[0.3, 0.6]);
        store.set_true_compromised(NodeId(1), true).unwrap();
        store.set_observed_compromised(NodeId(1), true).unwrap();
        assert_eq!(encode(&store, false), vec![0.3, 0.0, 0.6, 1.0]);
    }

    #[test]
    fn blue_view_hides_undetected_compromise() {
        let mut store = states(&[0.3, 0.6]);
        store.set_true_compromised(NodeId(0), true).unwrap();

        assert_eq!(encode(&store, false), vec![0.3, 0.0, 0.6, 0.0]);
        assert_eq!(encode(&store, true), vec![0.3, 1.0, 0.6, 0.0]);
    }

    #[test]
    fn machine_states_have_two_fields_each() {
        let store = states(&[0.25, 0.5, 0.75]);
        let rows = machine_states(&store, true);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], [0.75, 0.0]);
    }
}
