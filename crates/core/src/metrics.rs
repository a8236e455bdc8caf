//! 메트릭 상수 및 설명 등록
//!
//! 엔진이 기록하는 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! 레코더가 설치되지 않으면 모든 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `breachsim_`
//! - 모듈명: `engine_`, `red_`, `blue_`
//! - 접미어: `_total` (counter), `_steps` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(breachsim_core::metrics::ENGINE_STEPS_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 블루 액션 종류 레이블 키 (patch, recover, noop, isolate, reconnect)
pub const LABEL_ACTION: &str = "action";

/// 침해 방식 레이블 키 (basic, zero_day)
pub const LABEL_METHOD: &str = "method";

/// 에피소드 종료 사유 레이블 키 (loss, step_limit)
pub const LABEL_REASON: &str = "reason";

// ─── Engine 메트릭 ─────────────────────────────────────────────────

/// Engine: 실행된 스텝 수 (counter)
pub const ENGINE_STEPS_TOTAL: &str = "breachsim_engine_steps_total";

/// Engine: 리셋 횟수 (counter)
pub const ENGINE_RESETS_TOTAL: &str = "breachsim_engine_resets_total";

/// Engine: 종료된 에피소드 수 (counter, label: reason)
pub const ENGINE_EPISODES_TOTAL: &str = "breachsim_engine_episodes_total";

/// Engine: 현재 실제 침해 노드 수 (gauge)
pub const ENGINE_COMPROMISED_NODES: &str = "breachsim_engine_compromised_nodes";

/// Engine: 현재 격리된 노드 수 (gauge)
pub const ENGINE_ISOLATED_NODES: &str = "breachsim_engine_isolated_nodes";

/// Engine: 에피소드 길이 (histogram, 스텝)
pub const ENGINE_EPISODE_LENGTH_STEPS: &str = "breachsim_engine_episode_length_steps";

// ─── Red 메트릭 ────────────────────────────────────────────────────

/// Red: 성공한 침해 수 (counter, label: method)
pub const RED_COMPROMISES_TOTAL: &str = "breachsim_red_compromises_total";

/// Red: 실패한 기본 공격 수 (counter)
pub const RED_ATTACK_FAILURES_TOTAL: &str = "breachsim_red_attack_failures_total";

/// Red: 개발된 제로데이 수 (counter)
pub const RED_ZERO_DAYS_DEVELOPED_TOTAL: &str = "breachsim_red_zero_days_developed_total";

/// Red: 침해 노드 간 이동 수 (counter)
pub const RED_MOVES_TOTAL: &str = "breachsim_red_moves_total";

/// Red: 복구로 인해 위치를 잃은 횟수 (counter)
pub const RED_EVICTIONS_TOTAL: &str = "breachsim_red_evictions_total";

// ─── Blue 메트릭 ───────────────────────────────────────────────────

/// Blue: 실행된 액션 수 (counter, label: action)
pub const BLUE_ACTIONS_TOTAL: &str = "breachsim_blue_actions_total";

/// Blue: 탐지된 침해 수 (counter)
pub const BLUE_DETECTIONS_TOTAL: &str = "breachsim_blue_detections_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 에피소드 길이 히스토그램 버킷 (스텝)
pub const EPISODE_LENGTH_BUCKETS: [f64; 8] = [5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Engine
    describe_counter!(ENGINE_STEPS_TOTAL, "Total number of environment steps");
    describe_counter!(ENGINE_RESETS_TOTAL, "Total number of episode resets");
    describe_counter!(
        ENGINE_EPISODES_TOTAL,
        "Finished episodes by termination reason"
    );
    describe_gauge!(
        ENGINE_COMPROMISED_NODES,
        "Number of truly compromised nodes in the current episode"
    );
    describe_gauge!(
        ENGINE_ISOLATED_NODES,
        "Number of isolated nodes in the current episode"
    );
    describe_histogram!(
        ENGINE_EPISODE_LENGTH_STEPS,
        "Episode length in steps at termination"
    );

    // Red
    describe_counter!(
        RED_COMPROMISES_TOTAL,
        "Successful compromises by method (basic, zero_day)"
    );
    describe_counter!(RED_ATTACK_FAILURES_TOTAL, "Failed basic attacks");
    describe_counter!(
        RED_ZERO_DAYS_DEVELOPED_TOTAL,
        "Zero-day exploits developed from accumulated attacks"
    );
    describe_counter!(RED_MOVES_TOTAL, "Red moves between compromised nodes");
    describe_counter!(
        RED_EVICTIONS_TOTAL,
        "Times red lost its position because blue recovered it"
    );

    // Blue
    describe_counter!(BLUE_ACTIONS_TOTAL, "Blue actions applied by kind");
    describe_counter!(
        BLUE_DETECTIONS_TOTAL,
        "Compromises detected by blue"
    );
}
