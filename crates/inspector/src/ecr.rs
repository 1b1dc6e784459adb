//! ECR-backed [`RegistryClient`] implementation.
//!
//! Credentials and region come from the standard AWS provider chain,
//! optionally narrowed by the `[aws]` section of `regcheck.toml`.
//! Error payloads are flattened to strings here so that no SDK type
//! leaves this module.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types::Repository;
use regcheck_core::config::AwsConfig;
use regcheck_core::types::{LiveRepository, PolicyDocument, TagSet};
use tracing::debug;

use crate::client::RegistryClient;
use crate::error::InspectorError;

/// DescribeRepositories가 한 요청에 받는 저장소 이름의 최대 개수
pub const MAX_DESCRIBE_BATCH: usize = 100;

/// Splits repository names into request-sized batches, preserving order.
fn describe_batches(names: &[String]) -> std::slice::Chunks<'_, String> {
    names.chunks(MAX_DESCRIBE_BATCH)
}

/// Production registry client using `aws-sdk-ecr`.
#[derive(Clone, Debug)]
pub struct EcrRegistryClient {
    client: aws_sdk_ecr::Client,
}

impl EcrRegistryClient {
    /// Wraps an already configured SDK client.
    pub fn new(client: aws_sdk_ecr::Client) -> Self {
        Self { client }
    }

    /// Builds a client from the `[aws]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::Connection`] when no region can be resolved
    /// from either the configuration or the AWS provider chain.
    pub async fn connect(aws: &AwsConfig) -> Result<Self, InspectorError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = aws.region() {
            loader = loader.region(Region::new(region.to_owned()));
        }
        if let Some(profile) = aws.profile() {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = aws.endpoint_url() {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let Some(region) = shared.region() else {
            return Err(InspectorError::Connection(
                "no AWS region configured (set aws.region or AWS_REGION)".to_owned(),
            ));
        };
        debug!(region = %region, "ecr client configured");

        Ok(Self::new(aws_sdk_ecr::Client::new(&shared)))
    }

    /// 한 번의 DescribeRepositories 요청 (최대 [`MAX_DESCRIBE_BATCH`]개 이름)
    async fn describe_batch(&self, names: &[String]) -> Result<Vec<LiveRepository>, InspectorError> {
        let result = self
            .client
            .describe_repositories()
            .set_repository_names(Some(names.to_vec()))
            .send()
            .await;

        match result {
            Ok(output) => Ok(output
                .repositories()
                .iter()
                .filter_map(convert_repository)
                .collect()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_repository_not_found_exception()) =>
            {
                // 배치 요청은 하나라도 없으면 전체가 실패하므로 이름별로 다시 조회
                debug!(count = names.len(), "batch describe missed, falling back to per-name");
                let mut found = Vec::with_capacity(names.len());
                for name in names {
                    if let Some(repo) = self.describe_one(name).await? {
                        found.push(repo);
                    }
                }
                Ok(found)
            }
            Err(err) => Err(InspectorError::api(
                "DescribeRepositories",
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn describe_one(&self, name: &str) -> Result<Option<LiveRepository>, InspectorError> {
        match self
            .client
            .describe_repositories()
            .repository_names(name)
            .send()
            .await
        {
            Ok(output) => Ok(output.repositories().iter().find_map(convert_repository)),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_repository_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(InspectorError::api(
                "DescribeRepositories",
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }
}

/// Converts an SDK repository record, dropping records without a name or ARN.
fn convert_repository(repo: &Repository) -> Option<LiveRepository> {
    let name = repo.repository_name()?;
    let arn = repo.repository_arn()?;
    Some(LiveRepository {
        name: name.to_owned(),
        arn: arn.to_owned(),
        uri: repo.repository_uri().unwrap_or_default().to_owned(),
        registry_id: repo.registry_id().unwrap_or_default().to_owned(),
        image_tag_mutability: repo
            .image_tag_mutability()
            .map(|m| m.as_str().to_owned()),
        scan_on_push: repo
            .image_scanning_configuration()
            .is_some_and(|c| c.scan_on_push()),
    })
}

impl RegistryClient for EcrRegistryClient {
    async fn describe_repositories(
        &self,
        names: &[String],
    ) -> Result<Vec<LiveRepository>, InspectorError> {
        // 빈 목록을 보내면 계정 전체 저장소가 조회된다
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut found = Vec::with_capacity(names.len());
        for batch in describe_batches(names) {
            found.extend(self.describe_batch(batch).await?);
        }
        Ok(found)
    }

    async fn get_repository_policy(
        &self,
        name: &str,
    ) -> Result<Option<PolicyDocument>, InspectorError> {
        match self
            .client
            .get_repository_policy()
            .repository_name(name)
            .send()
            .await
        {
            Ok(output) => Ok(output.policy_text().map(|text| PolicyDocument {
                repository: name.to_owned(),
                text: text.to_owned(),
            })),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_repository_policy_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(InspectorError::api(
                "GetRepositoryPolicy",
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn get_lifecycle_policy(
        &self,
        name: &str,
    ) -> Result<Option<PolicyDocument>, InspectorError> {
        match self
            .client
            .get_lifecycle_policy()
            .repository_name(name)
            .send()
            .await
        {
            Ok(output) => Ok(output.lifecycle_policy_text().map(|text| PolicyDocument {
                repository: name.to_owned(),
                text: text.to_owned(),
            })),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_lifecycle_policy_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(InspectorError::api(
                "GetLifecyclePolicy",
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn list_tags(&self, arn: &str) -> Result<TagSet, InspectorError> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_arn(arn)
            .send()
            .await
            .map_err(|err| {
                InspectorError::api("ListTagsForResource", DisplayErrorContext(&err).to_string())
            })?;

        Ok(output
            .tags()
            .iter()
            .map(|tag| (tag.key().to_owned(), tag.value().to_owned()))
            .collect())
    }
}
