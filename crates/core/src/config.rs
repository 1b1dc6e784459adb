//! 설정 관리 — regcheck.toml 파싱 및 런타임 설정
//!
//! [`RegcheckConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`REGCHECK_AWS_REGION=us-east-2` 형식)
//! 3. 설정 파일 (`regcheck.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), regcheck_core::error::RegcheckError> {
//! use regcheck_core::config::RegcheckConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = RegcheckConfig::load("regcheck.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RegcheckConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RegcheckError};

/// 재시도 최대 횟수 상한
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// 재시도 백오프 기본 간격 상한 (밀리초)
pub const MAX_RETRY_BACKOFF_BASE_MS: u64 = 30_000;

/// regcheck 통합 설정
///
/// `regcheck.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegcheckConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// AWS SDK 설정
    #[serde(default)]
    pub aws: AwsConfig,
    /// 리소스 인스펙터 설정
    #[serde(default)]
    pub inspector: InspectorConfig,
    /// 시나리오 위치 설정
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl RegcheckConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RegcheckError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RegcheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RegcheckError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RegcheckError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RegcheckError> {
        toml::from_str(toml_str).map_err(|e| {
            RegcheckError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `REGCHECK_{SECTION}_{FIELD}`
    /// 예: `REGCHECK_AWS_REGION=us-east-2`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "REGCHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "REGCHECK_GENERAL_LOG_FORMAT");

        // AWS
        override_string(&mut self.aws.region, "REGCHECK_AWS_REGION");
        override_string(&mut self.aws.profile, "REGCHECK_AWS_PROFILE");
        override_string(&mut self.aws.endpoint_url, "REGCHECK_AWS_ENDPOINT_URL");

        // Inspector
        override_u32(
            &mut self.inspector.retry_max_attempts,
            "REGCHECK_INSPECTOR_RETRY_MAX_ATTEMPTS",
        );
        override_u64(
            &mut self.inspector.retry_backoff_base_ms,
            "REGCHECK_INSPECTOR_RETRY_BACKOFF_BASE_MS",
        );

        // Scenario
        override_string(
            &mut self.scenario.config_folder,
            "REGCHECK_SCENARIO_CONFIG_FOLDER",
        );
        override_string(
            &mut self.scenario.var_file_name,
            "REGCHECK_SCENARIO_VAR_FILE_NAME",
        );
        override_string(
            &mut self.scenario.definitions_dir,
            "REGCHECK_SCENARIO_DEFINITIONS_DIR",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RegcheckError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if !self.aws.endpoint_url.is_empty()
            && !(self.aws.endpoint_url.starts_with("http://")
                || self.aws.endpoint_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "aws.endpoint_url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            }
            .into());
        }

        if self.inspector.retry_max_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::InvalidValue {
                field: "inspector.retry_max_attempts".to_owned(),
                reason: format!("must be 0-{MAX_RETRY_ATTEMPTS}"),
            }
            .into());
        }

        if self.inspector.retry_backoff_base_ms > MAX_RETRY_BACKOFF_BASE_MS {
            return Err(ConfigError::InvalidValue {
                field: "inspector.retry_backoff_base_ms".to_owned(),
                reason: format!("must be 0-{MAX_RETRY_BACKOFF_BASE_MS}"),
            }
            .into());
        }

        if self.scenario.config_folder.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scenario.config_folder".to_owned(),
                reason: "config_folder must not be empty".to_owned(),
            }
            .into());
        }

        if self.scenario.var_file_name.is_empty()
            || self.scenario.var_file_name.contains(['/', '\\'])
        {
            return Err(ConfigError::InvalidValue {
                field: "scenario.var_file_name".to_owned(),
                reason: "must be a plain file name".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// AWS SDK 설정
///
/// 빈 문자열은 "SDK 기본 체인 사용"을 의미합니다.
/// 자격 증명은 여기서 다루지 않습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// 리전 (예: us-east-2)
    pub region: String,
    /// 공유 설정 파일의 프로필 이름
    pub profile: String,
    /// 커스텀 엔드포인트 (LocalStack 등)
    pub endpoint_url: String,
}

impl AwsConfig {
    /// 설정된 리전. 비어 있으면 `None`
    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    /// 설정된 프로필. 비어 있으면 `None`
    pub fn profile(&self) -> Option<&str> {
        non_empty(&self.profile)
    }

    /// 설정된 엔드포인트. 비어 있으면 `None`
    pub fn endpoint_url(&self) -> Option<&str> {
        non_empty(&self.endpoint_url)
    }
}

/// 리소스 인스펙터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// 프로바이더 API 에러 시 재시도 최대 횟수 (0 = 재시도 없음)
    pub retry_max_attempts: u32,
    /// 재시도 백오프 기본 간격 (밀리초, 선형 증가)
    pub retry_backoff_base_ms: u64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            retry_max_attempts: 0,
            retry_backoff_base_ms: 500,
        }
    }
}

/// 시나리오 위치 설정
///
/// 변수 파일 경로는 `{config_folder}/{시나리오 디렉토리}/{var_file_name}`으로 조합됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// 시나리오별 변수 디렉토리들의 상위 폴더
    pub config_folder: String,
    /// 변수 파일 이름
    pub var_file_name: String,
    /// 추가 시나리오 정의(TOML) 디렉토리. 비어 있으면 내장 시나리오만 사용
    pub definitions_dir: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            config_folder: "../../examples".to_owned(),
            var_file_name: "test.tfvars".to_owned(),
            definitions_dir: String::new(),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
