//! 토폴로지 생성기
//!
//! 외부 토폴로지가 주어지지 않을 때 사용할 그래프를 만듭니다.
//! 모든 생성기는 주어진 RNG만 사용하므로 시드가 같으면 결과도 같습니다.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::NetworkError;
use crate::topology::{EntrySelection, TopologySpec};

/// 연결된 임의 그래프를 생성합니다.
///
/// 먼저 임의 순서의 신장 트리로 연결성을 보장한 뒤, 나머지 노드 쌍마다
/// `edge_probability` 확률로 간선을 추가합니다.
pub fn random_connected<R: Rng + ?Sized>(
    node_count: usize,
    edge_probability: f64,
    entry_nodes: EntrySelection,
    rng: &mut R,
) -> Result<TopologySpec, NetworkError> {
    if node_count == 0 {
        return Err(NetworkError::InvalidTopology(
            "at least one node is required".to_owned(),
        ));
    }
    if !(0.0..=1.0).contains(&edge_probability) {
        return Err(NetworkError::InvalidTopology(format!(
            "edge probability {edge_probability} outside [0, 1]"
        )));
    }

    let mut order: Vec<usize> = (0..node_count).collect();
    order.shuffle(rng);

    let mut adjacent = vec![vec![false; node_count]; node_count];
    let mut edges = Vec::new();
    let mut connect = |a: usize, b: usize, edges: &mut Vec<(usize, usize)>| {
        let (lo, hi) = (a.min(b), a.max(b));
        if !adjacent[lo][hi] {
            adjacent[lo][hi] = true;
            edges.push((lo, hi));
        }
    };

    // 신장 트리
    for i in 1..node_count {
        let parent = order[rng.gen_range(0..i)];
        connect(order[i], parent, &mut edges);
    }

    // 추가 간선
    for a in 0..node_count {
        for b in (a + 1)..node_count {
            if rng.gen_bool(edge_probability) {
                connect(a, b, &mut edges);
            }
        }
    }

    edges.sort_unstable();
    Ok(TopologySpec {
        node_count,
        edges,
        entry_nodes,
    })
}

/// 0-1-2-...-(n-1) 직선 그래프
pub fn line(node_count: usize, entry_nodes: EntrySelection) -> TopologySpec {
    TopologySpec {
        node_count,
        edges: (1..node_count).map(|i| (i - 1, i)).collect(),
        entry_nodes,
    }
}

/// 노드 0을 중심으로 하는 성형 그래프
pub fn star(node_count: usize, entry_nodes: EntrySelection) -> TopologySpec {
    TopologySpec {
        node_count,
        edges: (1..node_count).map(|i| (0, i)).collect(),
        entry_nodes,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn is_connected(spec: &TopologySpec) -> bool {
        let mut adj = vec![Vec::new(); spec.node_count];
        for &(a, b) in &spec.edges {
            adj[a].push(b);
            adj[b].push(a);
        }
        let mut seen = vec![false; spec.node_count];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;
        while let Some(n) = queue.pop_front() {
            for &m in &adj[n] {
                if !seen[m] {
                    seen[m] = true;
                    queue.push_back(m);
                }
            }
        }
        seen.iter().all(|s| *s)
    }

    #[test]
    fn random_graph_is_connected_even_without_extra_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let spec =
            random_connected(25, 0.0, EntrySelection::First { count: 1 }, &mut rng).unwrap();
        assert_eq!(spec.edges.len(), 24);
        assert!(is_connected(&spec));
        spec.validate().unwrap();
    }

    #[test]
    fn full_probability_yields_complete_graph() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let spec =
            random_connected(6, 1.0, EntrySelection::First { count: 1 }, &mut rng).unwrap();
        assert_eq!(spec.edges.len(), 15);
    }

    #[test]
    fn same_seed_same_graph() {
        let a = random_connected(
            12,
            0.3,
            EntrySelection::Random { count: 2 },
            &mut ChaCha8Rng::seed_from_u64(77),
        )
        .unwrap();
        let b = random_connected(
            12,
            0.3,
            EntrySelection::Random { count: 2 },
            &mut ChaCha8Rng::seed_from_u64(77),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_probability() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(random_connected(3, 1.5, EntrySelection::First { count: 1 }, &mut rng).is_err());
        assert!(random_connected(0, 0.5, EntrySelection::First { count: 1 }, &mut rng).is_err());
    }

    #[test]
    fn single_node_graph_has_no_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let spec = random_connected(1, 0.5, EntrySelection::First { count: 1 }, &mut rng).unwrap();
        assert!(spec.edges.is_empty());
    }

    #[test]
    fn fixed_shapes() {
        let l = line(4, EntrySelection::First { count: 1 });
        assert_eq!(l.edges, vec![(0, 1), (1, 2), (2, 3)]);
        let s = star(4, EntrySelection::First { count: 1 });
        assert_eq!(s.edges, vec![(0, 1), (0, 2), (0, 3)]);
    }
}
