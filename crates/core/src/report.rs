//! 검증 리포트 — 서브 체크별 결과와 시나리오 집계
//!
//! 시나리오는 하나라도 실패한 서브 체크가 있으면 실패입니다.
//! 리포트는 항상 모든 서브 체크를 이름과 함께 나열하며, 단일 bool로 축약하지 않습니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 서브 체크 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// 통과
    Passed,
    /// 실패
    Failed,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "PASS"),
            Self::Failed => write!(f, "FAIL"),
        }
    }
}

/// 서브 체크 실패 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 전송/인증/잘못된 요청 등 프로바이더 API 실패
    ProviderApi,
    /// 실제 값을 가져왔지만 기대값과 다름
    ExpectationMismatch,
    /// 조회한 하위 리소스(정책 등)가 존재하지 않음
    ResourceAbsent,
    /// 참조한 프로비저닝 출력값이 없음
    OutputNotFound,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ProviderApi => "provider_api",
            Self::ExpectationMismatch => "expectation_mismatch",
            Self::ResourceAbsent => "resource_absent",
            Self::OutputNotFound => "output_not_found",
        };
        f.write_str(name)
    }
}

/// 서브 체크 하나의 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// 리포트에 표시되는 체크 이름
    pub name: String,
    /// 통과/실패
    pub status: CheckStatus,
    /// 실패 분류 (통과 시 `None`)
    pub failure: Option<FailureKind>,
    /// 기대값 요약
    pub expected: Option<String>,
    /// 실제값 요약
    pub actual: Option<String>,
    /// 사람이 읽는 설명
    pub message: String,
}

impl CheckOutcome {
    /// 통과 결과를 생성합니다.
    pub fn passed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Passed,
            failure: None,
            expected: None,
            actual: None,
            message: message.into(),
        }
    }

    /// 실패 결과를 생성합니다.
    pub fn failed(
        name: impl Into<String>,
        failure: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed,
            failure: Some(failure),
            expected: None,
            actual: None,
            message: message.into(),
        }
    }

    /// 기대값/실제값을 덧붙입니다.
    pub fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// 통과 여부
    pub fn is_passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}

/// 시나리오 한 번 실행의 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// 시나리오 이름
    pub scenario: String,
    /// 실행 ID (로그 상관관계용)
    pub run_id: Uuid,
    /// 시작 시각
    pub started_at: DateTime<Utc>,
    /// 종료 시각
    pub finished_at: DateTime<Utc>,
    /// 이번 실행에서 검사한 대상 식별자
    pub targets: Vec<String>,
    /// 서브 체크 결과 (정의 순서)
    pub outcomes: Vec<CheckOutcome>,
}

impl ScenarioReport {
    /// 모든 서브 체크가 통과했는지 여부
    ///
    /// 서브 체크가 하나도 없으면 실패로 취급합니다.
    pub fn passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(CheckOutcome::is_passed)
    }

    /// 통과한 서브 체크 수
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_passed()).count()
    }

    /// 실패한 서브 체크 수
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.passed_count()
    }

    /// 이름으로 서브 체크 결과를 찾습니다.
    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// 실패한 서브 체크 목록
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.is_passed())
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} sub-checks passed",
            self.scenario,
            self.passed_count(),
            self.outcomes.len()
        )
    }
}
