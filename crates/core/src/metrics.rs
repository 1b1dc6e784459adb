//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더 설치는 하네스를 감싸는 쪽의 몫이며, 설치되지 않으면 기록은 무시됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `regcheck_`
//! - 접미어: `_total` (counter)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (passed, failed / success, failure)
pub const LABEL_RESULT: &str = "result";

/// 프로바이더 API 오퍼레이션 레이블 키
pub const LABEL_OPERATION: &str = "operation";

/// 시나리오 이름 레이블 키
pub const LABEL_SCENARIO: &str = "scenario";

// ─── Inspector 메트릭 ──────────────────────────────────────────────

/// Inspector: 프로바이더 API 호출 수 (counter, label: operation, result)
pub const PROVIDER_CALLS_TOTAL: &str = "regcheck_provider_calls_total";

/// Inspector: 재시도 수 (counter, label: operation)
pub const PROVIDER_RETRIES_TOTAL: &str = "regcheck_provider_retries_total";

// ─── Verifier 메트릭 ───────────────────────────────────────────────

/// Verifier: 평가된 서브 체크 수 (counter, label: result)
pub const CHECKS_TOTAL: &str = "regcheck_checks_total";

/// Verifier: 완료된 시나리오 수 (counter, label: scenario, result)
pub const SCENARIOS_TOTAL: &str = "regcheck_scenarios_total";

/// 결과 레이블 값
pub fn result_label(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더를 설치한 직후 한 번 호출합니다.
/// `metrics::describe_counter!()`는 레코더가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        PROVIDER_CALLS_TOTAL,
        "Provider API calls issued by the resource inspector"
    );
    describe_counter!(
        PROVIDER_RETRIES_TOTAL,
        "Provider API calls retried after a provider error"
    );
    describe_counter!(CHECKS_TOTAL, "Sub-checks evaluated, by result");
    describe_counter!(SCENARIOS_TOTAL, "Scenario runs completed, by result");
}
