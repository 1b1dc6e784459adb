//! 검증기 에러 타입
//!
//! [`VerifierError`]는 시나리오 정의와 실행 준비 단계의 실패를 표현합니다.
//! 서브 체크 실패는 에러가 아니라 [`CheckOutcome`](regcheck_core::report::CheckOutcome)으로 기록됩니다.

use regcheck_core::error::{DeclaredConfigError, RegcheckError, ScenarioError};

/// 검증기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// 선언 설정 또는 프로비저닝 출력값 문제 (시나리오 중단)
    #[error(transparent)]
    Declared(#[from] DeclaredConfigError),

    /// 카탈로그에 없는 시나리오
    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    /// 시나리오 파일 로딩 실패
    #[error("scenario load error: {path}: {reason}")]
    ScenarioLoad {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 시나리오 정의 검증 실패
    #[error("scenario '{scenario}' is invalid: {reason}")]
    ScenarioValidation {
        /// 시나리오 이름
        scenario: String,
        /// 실패 사유
        reason: String,
    },
}

impl VerifierError {
    /// 시나리오 실행 중단 에러인지 여부
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Declared(_))
    }
}

impl From<VerifierError> for RegcheckError {
    fn from(err: VerifierError) -> Self {
        match err {
            VerifierError::Declared(e) => RegcheckError::Declared(e),
            VerifierError::ScenarioNotFound(name) => {
                RegcheckError::Scenario(ScenarioError::NotFound(name))
            }
            VerifierError::ScenarioLoad { path, reason } => {
                RegcheckError::Scenario(ScenarioError::Load { path, reason })
            }
            VerifierError::ScenarioValidation { scenario, reason } => {
                RegcheckError::Scenario(ScenarioError::Validation { scenario, reason })
            }
        }
    }
}
