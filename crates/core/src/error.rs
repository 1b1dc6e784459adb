//! 에러 타입 — 도메인별 에러 정의
//!
//! 검증 하네스의 에러는 두 부류로 나뉩니다.
//!
//! - 시나리오를 즉시 중단시키는 에러: [`DeclaredConfigError`] (식별자 없이 진행 불가)
//! - 서브 체크 하나의 실패로 기록되는 에러: [`ProviderError`]
//!
//! 기대값 불일치(`ExpectationMismatch`)와 리소스 부재(`ResourceAbsent`)는 에러가 아니라
//! 리포트 데이터입니다. [`crate::report::FailureKind`]를 참고하세요.

/// regcheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RegcheckError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 선언 설정(변수 파일) 에러
    #[error("declared config error: {0}")]
    Declared(#[from] DeclaredConfigError),

    /// 프로바이더 API 에러
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// 시나리오 정의 에러
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegcheckError {
    /// 시나리오 실행을 중단시켜야 하는 에러인지 여부
    pub fn is_scenario_abort(&self) -> bool {
        matches!(self, Self::Declared(_))
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 선언 설정 에러 — 변수 파일을 읽거나 변수를 찾는 과정의 실패
#[derive(Debug, thiserror::Error)]
pub enum DeclaredConfigError {
    /// 변수 파일이 존재하지 않음
    #[error("variables file not found: {path}")]
    FileNotFound { path: String },

    /// 변수 파일 크기 초과
    #[error("variables file too large: {path}: {size} bytes (max: {max})")]
    TooLarge { path: String, size: u64, max: u64 },

    /// 변수 파일 구문 에러
    #[error("failed to parse {path} at line {line}: {reason}")]
    ParseFailed {
        path: String,
        line: usize,
        reason: String,
    },

    /// 필수 변수가 선언되지 않음
    #[error("variable '{variable}' not found in {path}")]
    ConfigVariableNotFound { variable: String, path: String },

    /// 대상 식별자를 만들 출력값이 없음
    #[error("provisioning output '{output}' not found")]
    OutputNotFound { output: String },

    /// 값의 형태가 기대와 다름 (예: 문자열 대신 맵)
    #[error("variable '{variable}' has unexpected type: expected {expected}, got {actual}")]
    UnexpectedType {
        variable: String,
        expected: String,
        actual: String,
    },

    /// 파일 읽기 실패
    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },
}

/// 프로바이더 API 에러 — 전송, 인증, 잘못된 요청
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// API 호출 실패
    #[error("{operation} failed: {reason}")]
    Api { operation: String, reason: String },

    /// 유효하지 않은 리소스 식별자 (요청 자체가 잘못됨)
    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    /// 클라이언트 구성 실패
    #[error("client setup failed: {0}")]
    Client(String),
}

/// 시나리오 정의 에러
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// 시나리오를 찾을 수 없음
    #[error("scenario not found: {0}")]
    NotFound(String),

    /// 시나리오 파일 로딩 실패
    #[error("scenario load error: {path}: {reason}")]
    Load { path: String, reason: String },

    /// 시나리오 유효성 검증 실패
    #[error("scenario '{scenario}' is invalid: {reason}")]
    Validation { scenario: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_not_found_names_variable_and_path() {
        let err = DeclaredConfigError::ConfigVariableNotFound {
            variable: "name".to_owned(),
            path: "examples/ecr/test.tfvars".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'name'"));
        assert!(msg.contains("examples/ecr/test.tfvars"));
    }

    #[test]
    fn parse_failed_includes_line() {
        let err = DeclaredConfigError::ParseFailed {
            path: "test.tfvars".to_owned(),
            line: 7,
            reason: "unterminated string".to_owned(),
        };
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn provider_api_display() {
        let err = ProviderError::Api {
            operation: "GetLifecyclePolicy".to_owned(),
            reason: "AccessDeniedException".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GetLifecyclePolicy"));
        assert!(msg.contains("AccessDeniedException"));
    }

    #[test]
    fn declared_errors_abort_scenario() {
        let err: RegcheckError = DeclaredConfigError::ConfigVariableNotFound {
            variable: "name".to_owned(),
            path: "x".to_owned(),
        }
        .into();
        assert!(err.is_scenario_abort());
    }

    #[test]
    fn provider_errors_do_not_abort_scenario() {
        let err: RegcheckError = ProviderError::Api {
            operation: "DescribeRepositories".to_owned(),
            reason: "throttled".to_owned(),
        }
        .into();
        assert!(!err.is_scenario_abort());
    }

    #[test]
    fn config_error_converts_with_from() {
        let err: RegcheckError = ConfigError::InvalidValue {
            field: "general.log_level".to_owned(),
            reason: "bad".to_owned(),
        }
        .into();
        assert!(matches!(err, RegcheckError::Config(_)));
        assert!(err.to_string().contains("general.log_level"));
    }
}
