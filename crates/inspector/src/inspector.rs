//! 리소스 인스펙터
//!
//! [`ResourceInspector`]는 러너가 라이브 상태를 얻는 유일한 진입점입니다.
//! 식별자를 검증한 뒤 [`RegistryClient`]를 호출하고,
//! 설정된 경우에만 프로바이더 에러를 선형 백오프로 재시도합니다.
//!
//! # 사용 예시
//! ```ignore
//! let client = Arc::new(EcrRegistryClient::connect(&config.aws).await?);
//! let inspector = ResourceInspector::new(client);
//! let repos = inspector.describe(&["ecr-test".to_owned()]).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use regcheck_core::metrics as m;
use regcheck_core::types::{LiveRepository, PolicyDocument, TagSet};
use tracing::{debug, warn};

use crate::client::{RegistryClient, validate_arn, validate_repository_name};
use crate::config::ResourceInspectorConfig;
use crate::error::InspectorError;

/// 라이브 상태 조회기
pub struct ResourceInspector<C: RegistryClient> {
    client: Arc<C>,
    config: ResourceInspectorConfig,
}

impl<C: RegistryClient> ResourceInspector<C> {
    /// 기본 설정(재시도 없음)으로 인스펙터를 생성합니다.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            config: ResourceInspectorConfig::default(),
        }
    }

    /// 설정을 지정합니다.
    pub fn with_config(mut self, config: ResourceInspectorConfig) -> Self {
        self.config = config;
        self
    }

    /// 현재 설정
    pub fn config(&self) -> &ResourceInspectorConfig {
        &self.config
    }

    /// 이름으로 저장소를 조회합니다.
    ///
    /// 존재하지 않는 이름은 결과에서 빠집니다. 빈 목록은 API를 호출하지 않습니다.
    pub async fn describe(&self, names: &[String]) -> Result<Vec<LiveRepository>, InspectorError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        for name in names {
            validate_repository_name(name)?;
        }

        let repos = self
            .with_retry("DescribeRepositories", || {
                self.client.describe_repositories(names)
            })
            .await?;
        debug!(requested = names.len(), found = repos.len(), "described repositories");
        Ok(repos)
    }

    /// 저장소 접근 정책을 조회합니다. 정책이 없으면 `None`.
    pub async fn fetch_access_policy(
        &self,
        name: &str,
    ) -> Result<Option<PolicyDocument>, InspectorError> {
        validate_repository_name(name)?;
        self.with_retry("GetRepositoryPolicy", || {
            self.client.get_repository_policy(name)
        })
        .await
    }

    /// 저장소 수명주기 정책을 조회합니다. 정책이 없으면 `None`.
    pub async fn fetch_lifecycle_policy(
        &self,
        name: &str,
    ) -> Result<Option<PolicyDocument>, InspectorError> {
        validate_repository_name(name)?;
        self.with_retry("GetLifecyclePolicy", || {
            self.client.get_lifecycle_policy(name)
        })
        .await
    }

    /// ARN으로 리소스 태그를 조회합니다.
    pub async fn fetch_tags(&self, arn: &str) -> Result<TagSet, InspectorError> {
        validate_arn(arn)?;
        self.with_retry("ListTagsForResource", || self.client.list_tags(arn))
            .await
    }

    /// 재시도 대상 에러에 한해 선형 백오프로 다시 호출합니다.
    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, InspectorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, InspectorError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                let backoff = self.config.retry_backoff_base() * attempt;
                warn!(
                    operation = operation,
                    attempt = attempt,
                    backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    "retrying provider call"
                );
                metrics::counter!(m::PROVIDER_RETRIES_TOTAL, m::LABEL_OPERATION => operation)
                    .increment(1);
                tokio::time::sleep(backoff).await;
            }

            let result = call().await;
            metrics::counter!(
                m::PROVIDER_CALLS_TOTAL,
                m::LABEL_OPERATION => operation,
                m::LABEL_RESULT => m::result_label(result.is_ok())
            )
            .increment(1);

            match result {
                Err(err) if err.is_retryable() && attempt < self.config.retry_max_attempts => {
                    debug!(operation = operation, error = %err, "provider call failed");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
