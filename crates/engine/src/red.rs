//! 레드 팀 액션 해석
//!
//! 레드 팀은 `Unplaced`(위치 없음)에서 시작해 첫 침해에 성공하면 `Placed`가 됩니다.
//!
//! # 도달 가능 노드
//! - 위치 없음: 격리되지 않은 진입 노드
//! - 위치 있음 + 이동 가능: 현재 위치의 이웃
//! - 위치 있음 + 이동 불가: 모든 침해 노드의 이웃 합집합 + 격리되지 않은 진입 노드
//!
//! # 턴 정책
//! 1. 제로데이: 보유 중이고 미침해 후보가 있으면 하나만 소모해 반드시 침해
//! 2. 기본 공격: `skill * vulnerability / 100 >= threshold`이면 성공.
//!    공격할 때마다 개발 카운터가 오르고, `exploit_capability_dev`에 도달하면 제로데이 1개 확보
//! 3. 이동: 미침해 후보가 없고 이동 가능하면 도달 가능한 침해 노드로 이동
//! 4. 그 외에는 아무것도 하지 않음
//!
//! 블루 팀이 레드의 현재 위치를 복구하면 레드는 다음 턴 시작 시 위치를 잃습니다.
//! 아직 침해 상태인 노드가 남아 있으면 그중 하나로 재진입하며 턴을 소모하고,
//! 남은 거점이 없을 때만 `Unplaced`로 돌아갑니다.

use std::collections::BTreeSet;

use metrics::counter;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::debug;

use breachsim_core::metrics as m;
use breachsim_core::types::NodeId;
use breachsim_network::{MachineStore, NodeFilter, Topology};

use crate::config::{RedSettings, Targeting};
use crate::error::EngineError;

/// 레드 턴 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RedOutcome {
    /// 제로데이로 침해
    ZeroDay {
        /// 침해한 노드
        target: NodeId,
    },
    /// 기본 공격 성공
    Compromised {
        /// 침해한 노드
        target: NodeId,
        /// 공격력
        power: f64,
    },
    /// 기본 공격 실패
    AttackFailed {
        /// 공격한 노드
        target: NodeId,
        /// 공격력
        power: f64,
    },
    /// 침해 노드 간 이동
    Moved {
        /// 출발 노드
        from: NodeId,
        /// 도착 노드
        to: NodeId,
    },
    /// 위치를 잃은 뒤 남아 있는 침해 노드로 재진입
    Reentered {
        /// 재진입한 노드
        node: NodeId,
    },
    /// 도달 가능한 대상이 없음
    Idle,
}

impl RedOutcome {
    /// 이번 턴에 새로 침해한 노드
    pub fn compromised_node(&self) -> Option<NodeId> {
        match *self {
            Self::ZeroDay { target } | Self::Compromised { target, .. } => Some(target),
            _ => None,
        }
    }

    /// 로그/출력용 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ZeroDay { .. } => "zero_day",
            Self::Compromised { .. } => "compromised",
            Self::AttackFailed { .. } => "attack_failed",
            Self::Moved { .. } => "moved",
            Self::Reentered { .. } => "reentered",
            Self::Idle => "idle",
        }
    }
}

/// 레드 턴 전체 기록
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RedTurn {
    /// 턴 결과
    pub outcome: RedOutcome,
    /// 턴 시작 시 복구로 인해 위치를 잃었는지 여부
    pub evicted: bool,
    /// 이번 턴에 제로데이를 개발했는지 여부
    pub zero_day_developed: bool,
}

/// 레드 팀 에이전트
#[derive(Debug, Clone)]
pub struct RedAgent {
    settings: RedSettings,
    current: Option<NodeId>,
    previous: Option<NodeId>,
    zero_days: u32,
    exploit_progress: u32,
    trail: Vec<NodeId>,
}

impl RedAgent {
    /// 새 에이전트를 생성합니다.
    pub fn new(settings: RedSettings) -> Self {
        let zero_days = settings.zero_day_start;
        Self {
            settings,
            current: None,
            previous: None,
            zero_days,
            exploit_progress: 0,
            trail: Vec::new(),
        }
    }

    /// 에피소드 시작 상태로 되돌립니다.
    pub fn reset(&mut self) {
        *self = Self::new(self.settings.clone());
    }

    /// 설정
    pub fn settings(&self) -> &RedSettings {
        &self.settings
    }

    /// 현재 위치
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// 직전 위치
    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    /// 보유 제로데이 수
    pub fn zero_days(&self) -> u32 {
        self.zero_days
    }

    /// 제로데이 개발 진행도
    pub fn exploit_progress(&self) -> u32 {
        self.exploit_progress
    }

    /// 침해/이동한 노드의 순서 기록
    pub fn trail(&self) -> &[NodeId] {
        &self.trail
    }

    /// 공격력 `skill * vulnerability / 100`
    pub fn attack_power(&self, vulnerability: f64) -> f64 {
        self.settings.skill * vulnerability / 100.0
    }

    /// 기본 공격 성공 여부
    pub fn attack_succeeds(&self, vulnerability: f64) -> bool {
        self.attack_power(vulnerability) >= self.settings.attack_success_threshold
    }

    fn record_position(&mut self, target: NodeId) {
        // 위치를 잃은 상태에서는 마지막 위치를 previous로 유지
        if self.current.is_some() {
            self.previous = self.current;
        }
        self.current = Some(target);
        self.trail.push(target);
    }

    /// 현재 위치에서 `target`으로 이동합니다.
    pub fn move_to(&mut self, target: NodeId) -> Result<(), EngineError> {
        if self.current.is_none() {
            return Err(EngineError::NoRedPosition);
        }
        self.record_position(target);
        Ok(())
    }

    /// 기본 공격 1회를 개발 카운터에 반영합니다. 제로데이를 확보했으면 `true`를 반환합니다.
    pub fn register_attack(&mut self) -> bool {
        self.exploit_progress += 1;
        if self.exploit_progress >= self.settings.exploit_capability_dev {
            self.exploit_progress = 0;
            self.zero_days += 1;
            true
        } else {
            false
        }
    }

    /// 현재 도달 가능한 노드 집합 (침해 여부 무관)
    pub fn reachable(
        &self,
        topology: &Topology,
        store: &MachineStore,
    ) -> Result<BTreeSet<NodeId>, EngineError> {
        let Some(current) = self.current else {
            return Ok(topology.reachable_entry_nodes());
        };

        if self.settings.can_move {
            return Ok(topology.linked_nodes(current)?);
        }

        let mut nodes = topology.reachable_entry_nodes();
        for node in store.filter(NodeFilter::TrueCompromised) {
            nodes.extend(topology.linked_nodes(node)?);
        }
        Ok(nodes)
    }

    fn choose<R: Rng + ?Sized>(
        &self,
        candidates: &[NodeId],
        store: &MachineStore,
        rng: &mut R,
    ) -> Result<Option<NodeId>, EngineError> {
        match self.settings.targeting {
            Targeting::Random => Ok(candidates.choose(rng).copied()),
            Targeting::MostVulnerable => {
                let mut best: Option<(NodeId, f64)> = None;
                for &node in candidates {
                    let v = store.get(node)?.vulnerability;
                    if best.is_none_or(|(_, best_v)| v > best_v) {
                        best = Some((node, v));
                    }
                }
                Ok(best.map(|(node, _)| node))
            }
        }
    }

    fn compromise(&mut self, store: &mut MachineStore, target: NodeId) -> Result<(), EngineError> {
        store.set_true_compromised(target, true)?;
        self.record_position(target);
        Ok(())
    }

    /// 레드 팀의 한 턴을 진행합니다.
    pub fn take_turn<R: Rng + ?Sized>(
        &mut self,
        topology: &Topology,
        store: &mut MachineStore,
        rng: &mut R,
    ) -> Result<RedTurn, EngineError> {
        let mut evicted = false;
        let mut foothold = None;
        if let Some(current) = self.current {
            if !store.get(current)?.true_compromised {
                debug!(node = %current, "red evicted from recovered node");
                self.previous = Some(current);
                self.current = None;
                evicted = true;
                counter!(m::RED_EVICTIONS_TOTAL).increment(1);

                let remaining = store.filter(NodeFilter::TrueCompromised);
                foothold = self.choose(&remaining, store, rng)?;
            }
        }

        let (outcome, zero_day_developed) = match foothold {
            Some(node) => {
                self.record_position(node);
                (RedOutcome::Reentered { node }, false)
            }
            None => self.act(topology, store, rng)?,
        };

        debug!(
            outcome = outcome.kind(),
            position = ?self.current,
            zero_days = self.zero_days,
            progress = self.exploit_progress,
            "red turn resolved"
        );

        Ok(RedTurn {
            outcome,
            evicted,
            zero_day_developed,
        })
    }

    /// 현재 위치 기준 공격/이동/대기 중 하나를 수행합니다.
    fn act<R: Rng + ?Sized>(
        &mut self,
        topology: &Topology,
        store: &mut MachineStore,
        rng: &mut R,
    ) -> Result<(RedOutcome, bool), EngineError> {
        let reachable = self.reachable(topology, store)?;
        let mut clean = Vec::new();
        let mut owned = Vec::new();
        for node in reachable {
            if store.get(node)?.true_compromised {
                owned.push(node);
            } else {
                clean.push(node);
            }
        }

        let mut zero_day_developed = false;
        let outcome = if let Some(target) = self.choose(&clean, store, rng)? {
            if self.zero_days > 0 {
                self.zero_days -= 1;
                self.compromise(store, target)?;
                counter!(m::RED_COMPROMISES_TOTAL, m::LABEL_METHOD => "zero_day").increment(1);
                RedOutcome::ZeroDay { target }
            } else {
                let power = self.attack_power(store.get(target)?.vulnerability);
                zero_day_developed = self.register_attack();
                if zero_day_developed {
                    counter!(m::RED_ZERO_DAYS_DEVELOPED_TOTAL).increment(1);
                }
                if power >= self.settings.attack_success_threshold {
                    self.compromise(store, target)?;
                    counter!(m::RED_COMPROMISES_TOTAL, m::LABEL_METHOD => "basic").increment(1);
                    RedOutcome::Compromised { target, power }
                } else {
                    counter!(m::RED_ATTACK_FAILURES_TOTAL).increment(1);
                    RedOutcome::AttackFailed { target, power }
                }
            }
        } else {
            self.relocate(&owned, store, rng)?
        };
        Ok((outcome, zero_day_developed))
    }

    /// 미침해 후보가 없을 때의 위치 이동 (이동 또는 재진입)
    fn relocate<R: Rng + ?Sized>(
        &mut self,
        owned: &[NodeId],
        store: &MachineStore,
        rng: &mut R,
    ) -> Result<RedOutcome, EngineError> {
        match self.current {
            Some(from) if self.settings.can_move => {
                let targets: Vec<NodeId> = owned.iter().copied().filter(|n| *n != from).collect();
                match self.choose(&targets, store, rng)? {
                    Some(to) => {
                        self.move_to(to)?;
                        counter!(m::RED_MOVES_TOTAL).increment(1);
                        Ok(RedOutcome::Moved { from, to })
                    }
                    None => Ok(RedOutcome::Idle),
                }
            }
            Some(_) => Ok(RedOutcome::Idle),
            None => match self.choose(owned, store, rng)? {
                Some(node) => {
                    self.record_position(node);
                    Ok(RedOutcome::Reentered { node })
                }
                None => Ok(RedOutcome::Idle),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breachsim_core::types::NodeState;
    use breachsim_network::{EntrySelection, TopologySpec, VulnerabilityBounds};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn network(
        vulns: &[f64],
        edges: Vec<(usize, usize)>,
        entry: &[usize],
    ) -> (Topology, MachineStore) {
        let spec = TopologySpec {
            node_count: vulns.len(),
            edges,
            entry_nodes: EntrySelection::Explicit {
                nodes: entry.iter().copied().map(NodeId).collect(),
            },
        };
        let topology = Topology::from_spec(&spec, &mut rng()).unwrap();
        let nodes = vulns
            .iter()
            .map(|v| NodeState::new(Default::default(), *v))
            .collect();
        let bounds = VulnerabilityBounds::new(0.0, 1.0, 0.2, 0.39).unwrap();
        (topology, MachineStore::from_states(nodes, bounds).unwrap())
    }

    fn settings(skill: f64, threshold: f64, zero_days: u32) -> RedSettings {
        RedSettings {
            skill,
            attack_success_threshold: threshold,
            zero_day_start: zero_days,
            exploit_capability_dev: 3,
            can_move: false,
            targeting: Targeting::MostVulnerable,
        }
    }

    #[test]
    fn attack_threshold_examples() {
        let strong = RedAgent::new(settings(60.0, 0.2, 0));
        assert!(strong.attack_succeeds(0.5));

        let weak = RedAgent::new(settings(20.0, 0.9, 0));
        assert!(!weak.attack_succeeds(0.4));
    }

    #[test]
    fn attack_at_exact_threshold_succeeds() {
        let red = RedAgent::new(settings(50.0, 0.25, 0));
        assert!(red.attack_succeeds(0.5));
    }

    #[test]
    fn move_without_position_fails() {
        let mut red = RedAgent::new(settings(50.0, 0.2, 0));
        assert!(matches!(
            red.move_to(NodeId(1)),
            Err(EngineError::NoRedPosition)
        ));
    }

    #[test]
    fn register_attack_banks_zero_day_and_resets_counter() {
        let mut red = RedAgent::new(settings(50.0, 0.2, 0));
        assert!(!red.register_attack());
        assert!(!red.register_attack());
        assert_eq!(red.exploit_progress(), 2);
        assert!(red.register_attack());
        assert_eq!(red.zero_days(), 1);
        assert_eq!(red.exploit_progress(), 0);
    }

    #[test]
    fn unplaced_red_targets_only_entry_nodes() {
        let (topo, store) = network(&[0.5, 0.9, 0.9], vec![(0, 1), (1, 2)], &[0]);
        let red = RedAgent::new(settings(100.0, 0.0, 0));
        let reachable = red.reachable(&topo, &store).unwrap();
        assert_eq!(reachable, BTreeSet::from([NodeId(0)]));
    }

    #[test]
    fn zero_day_always_succeeds() {
        // 공격력 0 → 기본 공격으로는 절대 실패
        let (topo, mut store) = network(&[0.5, 0.5], vec![(0, 1)], &[0]);
        let mut red = RedAgent::new(settings(0.0, 1.0, 1));
        let turn = red.take_turn(&topo, &mut store, &mut rng()).unwrap();
        assert_eq!(turn.outcome, RedOutcome::ZeroDay { target: NodeId(0) });
        assert!(store.get(NodeId(0)).unwrap().true_compromised);
        assert_eq!(red.zero_days(), 0);
        assert_eq!(red.current(), Some(NodeId(0)));
    }

    #[test]
    fn only_one_zero_day_used_per_turn() {
        let (topo, mut store) = network(&[0.5, 0.5, 0.5], vec![(0, 1), (0, 2)], &[0]);
        let mut red = RedAgent::new(settings(0.0, 1.0, 3));
        red.take_turn(&topo, &mut store, &mut rng()).unwrap();
        assert_eq!(red.zero_days(), 2);
        assert_eq!(store.count(NodeFilter::TrueCompromised), 1);
    }

    #[test]
    fn failed_basic_attacks_develop_zero_day() {
        let (topo, mut store) = network(&[0.5, 0.5], vec![(0, 1)], &[0]);
        let mut red = RedAgent::new(settings(0.0, 1.0, 0));
        let mut r = rng();

        for _ in 0..2 {
            let turn = red.take_turn(&topo, &mut store, &mut r).unwrap();
            assert!(matches!(turn.outcome, RedOutcome::AttackFailed { .. }));
            assert!(!turn.zero_day_developed);
        }
        let turn = red.take_turn(&topo, &mut store, &mut r).unwrap();
        assert!(turn.zero_day_developed);
        assert_eq!(red.zero_days(), 1);
        assert_eq!(red.exploit_progress(), 0);

        // 다음 턴에 확보한 제로데이 사용
        let turn = red.take_turn(&topo, &mut store, &mut r).unwrap();
        assert_eq!(turn.outcome, RedOutcome::ZeroDay { target: NodeId(0) });
    }

    #[test]
    fn successful_basic_attacks_also_count_toward_development() {
        let (topo, mut store) =
            network(&[0.9, 0.9, 0.9, 0.9], vec![(0, 1), (1, 2), (2, 3)], &[0]);
        let mut red = RedAgent::new(settings(100.0, 0.1, 0));
        let mut r = rng();
        for _ in 0..3 {
            let turn = red.take_turn(&topo, &mut store, &mut r).unwrap();
            assert!(matches!(turn.outcome, RedOutcome::Compromised { .. }));
        }
        assert_eq!(red.zero_days(), 1);
    }

    #[test]
    fn most_vulnerable_targeting_breaks_ties_by_index() {
        let (topo, mut store) = network(&[0.3, 0.7, 0.7, 0.2], vec![], &[0, 1, 2, 3]);
        let mut red = RedAgent::new(settings(100.0, 0.0, 0));
        let turn = red.take_turn(&topo, &mut store, &mut rng()).unwrap();
        assert_eq!(red.current(), Some(NodeId(1)));
        assert!(matches!(
            turn.outcome,
            RedOutcome::Compromised { target: NodeId(1), .. }
        ));
    }

    #[test]
    fn placed_red_without_movement_reaches_all_compromised_neighbours() {
        // 0-1, 2-3, 진입 노드 0과 2
        let (topo, mut store) = network(&[0.5; 4], vec![(0, 1), (2, 3)], &[0, 2]);
        store.set_true_compromised(NodeId(0), true).unwrap();
        store.set_true_compromised(NodeId(2), true).unwrap();
        let mut red = RedAgent::new(settings(100.0, 0.0, 0));
        red.compromise(&mut store, NodeId(2)).unwrap();

        let reachable = red.reachable(&topo, &store).unwrap();
        assert_eq!(
            reachable,
            BTreeSet::from([NodeId(0), NodeId(1), NodeId(2), NodeId(3)])
        );
    }

    #[test]
    fn placed_red_with_movement_reaches_only_neighbours() {
        let (topo, mut store) = network(&[0.5; 4], vec![(0, 1), (1, 2), (2, 3)], &[0]);
        let mut s = settings(100.0, 0.0, 0);
        s.can_move = true;
        let mut red = RedAgent::new(s);
        red.compromise(&mut store, NodeId(1)).unwrap();
        assert_eq!(
            red.reachable(&topo, &store).unwrap(),
            BTreeSet::from([NodeId(0), NodeId(2)])
        );
    }

    #[test]
    fn moves_when_no_clean_target_is_reachable() {
        let (topo, mut store) = network(&[0.5, 0.5], vec![(0, 1)], &[0]);
        let mut s = settings(100.0, 0.0, 0);
        s.can_move = true;
        let mut red = RedAgent::new(s);
        red.compromise(&mut store, NodeId(0)).unwrap();
        red.compromise(&mut store, NodeId(1)).unwrap();

        let turn = red.take_turn(&topo, &mut store, &mut rng()).unwrap();
        assert_eq!(
            turn.outcome,
            RedOutcome::Moved {
                from: NodeId(1),
                to: NodeId(0)
            }
        );
        assert_eq!(red.previous(), Some(NodeId(1)));
        assert_eq!(red.trail(), &[NodeId(0), NodeId(1), NodeId(0)]);
    }

    #[test]
    fn isolated_network_is_a_noop() {
        let (mut topo, mut store) = network(&[0.9, 0.9], vec![(0, 1)], &[0]);
        topo.isolate(NodeId(0)).unwrap();
        let mut red = RedAgent::new(settings(100.0, 0.0, 1));
        let turn = red.take_turn(&topo, &mut store, &mut rng()).unwrap();
        assert_eq!(turn.outcome, RedOutcome::Idle);
        assert_eq!(red.zero_days(), 1);
        assert_eq!(store.count(NodeFilter::TrueCompromised), 0);
    }

    #[test]
    fn recovered_position_evicts_red() {
        let (topo, mut store) = network(&[0.9, 0.9], vec![(0, 1)], &[0]);
        let mut red = RedAgent::new(settings(100.0, 0.0, 0));
        let mut r = rng();
        red.take_turn(&topo, &mut store, &mut r).unwrap();
        assert_eq!(red.current(), Some(NodeId(0)));

        store.reset_to_initial(NodeId(0)).unwrap();
        let turn = red.take_turn(&topo, &mut store, &mut r).unwrap();
        assert!(turn.evicted);
        // 위치를 잃었으므로 진입 노드 0만 다시 공격 가능
        assert!(matches!(
            turn.outcome,
            RedOutcome::Compromised {
                target: NodeId(0),
                ..
            }
        ));
        assert_eq!(red.previous(), Some(NodeId(0)));
    }

    #[test]
    fn evicted_red_reenters_through_compromised_entry() {
        let (topo, mut store) = network(&[0.9, 0.9], vec![(0, 1)], &[0]);
        let mut red = RedAgent::new(settings(100.0, 0.0, 0));
        red.compromise(&mut store, NodeId(0)).unwrap();
        red.compromise(&mut store, NodeId(1)).unwrap();

        // 1만 복구되고 0은 여전히 침해 상태이므로 위치를 잃은 레드는 0으로 재진입
        store.reset_to_initial(NodeId(1)).unwrap();
        let turn = red.take_turn(&topo, &mut store, &mut rng()).unwrap();
        assert!(turn.evicted);
        assert_eq!(turn.outcome, RedOutcome::Reentered { node: NodeId(0) });
        assert_eq!(red.current(), Some(NodeId(0)));
    }

    #[test]
    fn evicted_red_falls_back_to_foothold_outside_entry_set() {
        // 0-1-2-3, 진입 노드 0. 레드가 0/1/2를 침해하고 2에 위치
        let (mut topo, mut store) = network(&[0.9; 4], vec![(0, 1), (1, 2), (2, 3)], &[0]);
        let mut red = RedAgent::new(settings(100.0, 0.0, 0));
        for node in [0, 1, 2] {
            red.compromise(&mut store, NodeId(node)).unwrap();
        }

        // 진입 노드와 현재 위치가 복구되고 진입 노드는 격리됨
        store.reset_to_initial(NodeId(0)).unwrap();
        store.reset_to_initial(NodeId(2)).unwrap();
        topo.isolate(NodeId(0)).unwrap();

        let mut r = rng();
        let turn = red.take_turn(&topo, &mut store, &mut r).unwrap();
        assert!(turn.evicted);
        assert_eq!(turn.outcome, RedOutcome::Reentered { node: NodeId(1) });
        assert_eq!(red.current(), Some(NodeId(1)));
        assert_eq!(red.previous(), Some(NodeId(2)));

        // 남은 거점에서 공격을 이어감
        let turn = red.take_turn(&topo, &mut store, &mut r).unwrap();
        assert!(!turn.evicted);
        assert!(matches!(
            turn.outcome,
            RedOutcome::Compromised {
                target: NodeId(2),
                ..
            }
        ));
    }

    #[test]
    fn reset_restores_starting_arsenal() {
        let (topo, mut store) = network(&[0.9], vec![], &[0]);
        let mut red = RedAgent::new(settings(100.0, 0.0, 2));
        red.take_turn(&topo, &mut store, &mut rng()).unwrap();
        red.reset();
        assert_eq!(red.zero_days(), 2);
        assert_eq!(red.current(), None);
        assert!(red.trail().is_empty());
    }
}
