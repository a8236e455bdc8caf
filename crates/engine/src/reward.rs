//! 보상 계산
//!
//! 스텝 보상은 그 스텝에서 일어난 사건의 수와 가중치의 선형 결합이며,
//! 에피소드가 끝나는 스텝에는 종료 보너스/페널티가 더해집니다.

use serde::{Deserialize, Serialize};

use breachsim_core::config::RewardConfig;
use breachsim_core::types::TerminationReason;

use crate::error::EngineError;

/// 보상 가중치 (모두 크기 값, 페널티는 차감)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    /// 새로 침해된 노드 1개당 페널티
    pub compromise_penalty: f64,
    /// 유효한 패치 1회당 보상
    pub patch_reward: f64,
    /// 침해 노드 복구 1회당 보상
    pub recover_reward: f64,
    /// 패배 페널티
    pub loss_penalty: f64,
    /// 최대 스텝 생존 보상
    pub win_reward: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            compromise_penalty: 1.0,
            patch_reward: 0.0,
            recover_reward: 0.5,
            loss_penalty: 100.0,
            win_reward: 100.0,
        }
    }
}

/// 한 스텝에서 보상에 반영되는 사건 집계
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepEvents {
    /// 새로 침해된 노드 수
    pub new_compromises: usize,
    /// 취약성을 실제로 낮춘 패치 수
    pub effective_patches: usize,
    /// 침해 상태였다가 복구된 노드 수
    pub recovered_compromised: usize,
    /// 이번 스텝에서 에피소드가 끝났다면 그 사유
    pub termination: Option<TerminationReason>,
}

impl RewardWeights {
    /// core 보상 설정에서 가중치를 가져옵니다.
    pub fn from_core(core: &RewardConfig) -> Self {
        Self {
            compromise_penalty: core.compromise_penalty,
            patch_reward: core.patch_reward,
            recover_reward: core.recover_reward,
            loss_penalty: core.loss_penalty,
            win_reward: core.win_reward,
        }
    }

    /// 모든 가중치가 유한한 값인지 검증합니다.
    pub fn validate(&self) -> Result<(), EngineError> {
        let weights = [
            ("reward.compromise_penalty", self.compromise_penalty),
            ("reward.patch_reward", self.patch_reward),
            ("reward.recover_reward", self.recover_reward),
            ("reward.loss_penalty", self.loss_penalty),
            ("reward.win_reward", self.win_reward),
        ];
        for (field, value) in weights {
            if !value.is_finite() {
                return Err(EngineError::config(field, "must be a finite number"));
            }
        }
        Ok(())
    }

    /// 스텝 보상을 계산합니다.
    pub fn score(&self, events: &StepEvents) -> f64 {
        let mut reward = -self.compromise_penalty * events.new_compromises as f64
            + self.patch_reward * events.effective_patches as f64
            + self.recover_reward * events.recovered_compromised as f64;

        match events.termination {
            Some(TerminationReason::Loss) => reward -= self.loss_penalty,
            Some(TerminationReason::StepLimit) => reward += self.win_reward,
            None => {}
        }
        reward
    }
}
