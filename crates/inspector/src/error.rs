//! 인스펙터 에러 타입
//!
//! [`InspectorError`]는 리소스 인스펙터 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<InspectorError> for RegcheckError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 정책이 존재하지 않는 것은 에러가 아닙니다. 조회 함수가 `Ok(None)`을 반환합니다.

use regcheck_core::error::{ConfigError, ProviderError, RegcheckError};

/// 리소스 인스펙터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum InspectorError {
    /// 프로바이더 API 호출 실패 (전송, 인증, 스로틀링, 리소스 없음 등)
    #[error("provider api error: {operation}: {reason}")]
    ProviderApi {
        /// API 오퍼레이션 이름 (예: `GetRepositoryPolicy`)
        operation: String,
        /// 실패 사유
        reason: String,
    },

    /// 요청 전에 거부된 식별자
    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// 문제가 된 식별자
        identifier: String,
        /// 거부 사유
        reason: String,
    },

    /// 프로바이더 클라이언트 구성 실패 (리전 미설정 등)
    #[error("provider client error: {0}")]
    Connection(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl InspectorError {
    /// 재시도 대상 에러인지 여부
    ///
    /// 잘못된 식별자는 몇 번을 다시 보내도 같은 결과이므로 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderApi { .. })
    }

    pub(crate) fn api(operation: &str, reason: impl Into<String>) -> Self {
        Self::ProviderApi {
            operation: operation.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<InspectorError> for RegcheckError {
    fn from(err: InspectorError) -> Self {
        match err {
            InspectorError::ProviderApi { operation, reason } => {
                RegcheckError::Provider(ProviderError::Api { operation, reason })
            }
            InspectorError::InvalidIdentifier { identifier, reason } => {
                RegcheckError::Provider(ProviderError::InvalidIdentifier { identifier, reason })
            }
            InspectorError::Connection(reason) => {
                RegcheckError::Provider(ProviderError::Client(reason))
            }
            InspectorError::Config { field, reason } => {
                RegcheckError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
