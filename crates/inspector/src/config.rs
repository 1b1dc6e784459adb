//! 리소스 인스펙터 설정
//!
//! [`ResourceInspectorConfig`]는 core의 [`InspectorConfig`](regcheck_core::config::InspectorConfig)를
//! 기반으로 인스펙터 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use regcheck_core::config::RegcheckConfig;
//! use regcheck_inspector::config::ResourceInspectorConfig;
//!
//! let core_config = RegcheckConfig::default();
//! let config = ResourceInspectorConfig::from_core(&core_config.inspector);
//! ```

use std::time::Duration;

use regcheck_core::config::{MAX_RETRY_ATTEMPTS, MAX_RETRY_BACKOFF_BASE_MS};
use serde::{Deserialize, Serialize};

use crate::error::InspectorError;

/// 리소스 인스펙터 설정
///
/// 재시도는 기본적으로 꺼져 있습니다. 프로바이더 에러는 그대로 체크 실패로 보고됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInspectorConfig {
    /// 프로바이더 에러 시 추가 시도 횟수 (0 = 재시도 없음)
    pub retry_max_attempts: u32,
    /// 재시도 백오프 기본 간격 (밀리초). n번째 재시도는 `base * n`만큼 대기합니다.
    pub retry_backoff_base_ms: u64,
}

impl Default for ResourceInspectorConfig {
    fn default() -> Self {
        Self {
            retry_max_attempts: 0,
            retry_backoff_base_ms: 500,
        }
    }
}

impl ResourceInspectorConfig {
    /// core의 `InspectorConfig`에서 인스펙터 설정을 생성합니다.
    pub fn from_core(core: &regcheck_core::config::InspectorConfig) -> Self {
        Self {
            retry_max_attempts: core.retry_max_attempts,
            retry_backoff_base_ms: core.retry_backoff_base_ms,
        }
    }

    /// 재시도 백오프 기본 간격
    pub fn retry_backoff_base(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_base_ms)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), InspectorError> {
        if self.retry_max_attempts > MAX_RETRY_ATTEMPTS {
            return Err(InspectorError::Config {
                field: "retry_max_attempts".to_owned(),
                reason: format!("must be 0-{MAX_RETRY_ATTEMPTS}"),
            });
        }

        if self.retry_backoff_base_ms > MAX_RETRY_BACKOFF_BASE_MS {
            return Err(InspectorError::Config {
                field: "retry_backoff_base_ms".to_owned(),
                reason: format!("must be 0-{MAX_RETRY_BACKOFF_BASE_MS}"),
            });
        }

        Ok(())
    }
}

/// 리소스 인스펙터 설정 빌더
#[derive(Default)]
pub struct ResourceInspectorConfigBuilder {
    config: ResourceInspectorConfig,
}

impl ResourceInspectorConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 재시도 최대 횟수를 설정합니다.
    pub fn retry_max_attempts(mut self, attempts: u32) -> Self {
        self.config.retry_max_attempts = attempts;
        self
    }

    /// 재시도 백오프 기본 간격(밀리초)을 설정합니다.
    pub fn retry_backoff_base_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_base_ms = ms;
        self
    }

    /// 설정을 검증하고 `ResourceInspectorConfig`를 생성합니다.
    pub fn build(self) -> Result<ResourceInspectorConfig, InspectorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
