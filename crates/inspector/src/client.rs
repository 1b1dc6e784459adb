//! Registry API abstraction for testability.
//!
//! The [`RegistryClient`] trait narrows the provider API down to the four
//! read-only lookups the harness needs. Production code uses
//! [`EcrRegistryClient`](crate::ecr::EcrRegistryClient); tests use
//! `MockRegistryClient`.
//!
//! ```text
//! ┌───────────────────┐
//! │ ResourceInspector │
//! └─────────┬─────────┘
//!           │
//!           ▼
//!   ┌────────────────┐
//!   │ RegistryClient │ (trait)
//!   └────────────────┘
//!        │       │
//!        ▼       ▼
//!    ┌─────┐  ┌──────┐
//!    │ ECR │  │ Mock │
//!    └─────┘  └──────┘
//! ```
//!
//! # Identifier Validation
//!
//! Repository names and ARNs are checked before any request is sent:
//! - names are 2-256 characters of lowercase path components
//!   (`[a-z0-9]+` joined by single `.`, `_` or `-`, separated by `/`)
//! - ARNs start with `arn:` and carry at least six `:`-separated fields

use std::future::Future;

use regcheck_core::types::{LiveRepository, PolicyDocument, TagSet};

use crate::error::InspectorError;

/// Minimum repository name length.
const MIN_REPOSITORY_NAME_LEN: usize = 2;

/// Maximum repository name length.
const MAX_REPOSITORY_NAME_LEN: usize = 256;

/// Maximum ARN length accepted by the tagging API.
const MAX_ARN_LEN: usize = 1011;

/// Validates a repository name against the registry naming grammar.
pub fn validate_repository_name(name: &str) -> Result<(), InspectorError> {
    let invalid = |reason: String| InspectorError::InvalidIdentifier {
        identifier: name.to_owned(),
        reason,
    };

    if name.len() < MIN_REPOSITORY_NAME_LEN || name.len() > MAX_REPOSITORY_NAME_LEN {
        return Err(invalid(format!(
            "length {} (must be {MIN_REPOSITORY_NAME_LEN}-{MAX_REPOSITORY_NAME_LEN})",
            name.len()
        )));
    }

    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid("empty path component".to_owned()));
        }
        let mut prev_separator = true;
        for c in component.chars() {
            match c {
                'a'..='z' | '0'..='9' => prev_separator = false,
                '.' | '_' | '-' => {
                    if prev_separator {
                        return Err(invalid(format!("misplaced separator '{c}'")));
                    }
                    prev_separator = true;
                }
                other => {
                    return Err(invalid(format!("unsupported character '{other}'")));
                }
            }
        }
        if prev_separator {
            return Err(invalid("path component ends with a separator".to_owned()));
        }
    }

    Ok(())
}

/// Validates a resource ARN before it is sent to the tagging API.
pub fn validate_arn(arn: &str) -> Result<(), InspectorError> {
    if arn.len() > MAX_ARN_LEN {
        return Err(InspectorError::InvalidIdentifier {
            identifier: arn.to_owned(),
            reason: format!("length {} exceeds {MAX_ARN_LEN}", arn.len()),
        });
    }
    if !arn.starts_with("arn:") || arn.splitn(6, ':').count() < 6 {
        return Err(InspectorError::InvalidIdentifier {
            identifier: arn.to_owned(),
            reason: "not an ARN".to_owned(),
        });
    }
    if arn.chars().any(char::is_whitespace) {
        return Err(InspectorError::InvalidIdentifier {
            identifier: arn.to_owned(),
            reason: "contains whitespace".to_owned(),
        });
    }
    Ok(())
}

/// Trait abstracting the registry lookups used by the inspector.
///
/// Implementations must be thread-safe (`Send + Sync + 'static`).
/// Absence of a policy is reported as `Ok(None)`, never as an error.
pub trait RegistryClient: Send + Sync + 'static {
    /// Describes the named repositories.
    ///
    /// Names the provider does not know are omitted from the result;
    /// only transport, auth and throttling failures are errors.
    fn describe_repositories(
        &self,
        names: &[String],
    ) -> impl Future<Output = Result<Vec<LiveRepository>, InspectorError>> + Send;

    /// Fetches the repository access policy, `None` when none is attached.
    fn get_repository_policy(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<PolicyDocument>, InspectorError>> + Send;

    /// Fetches the repository lifecycle policy, `None` when none is attached.
    fn get_lifecycle_policy(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<PolicyDocument>, InspectorError>> + Send;

    /// Lists the tags of the resource identified by `arn`.
    fn list_tags(&self, arn: &str) -> impl Future<Output = Result<TagSet, InspectorError>> + Send;
}

/// In-memory registry for unit tests.
#[cfg(test)]
#[derive(Default)]
pub struct MockRegistryClient {
    repositories: Vec<LiveRepository>,
    access_policies: std::collections::HashMap<String, String>,
    lifecycle_policies: std::collections::HashMap<String, String>,
    tags: std::collections::HashMap<String, TagSet>,
    fail_calls: bool,
    calls: std::sync::atomic::AtomicU32,
}

#[cfg(test)]
impl MockRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repositories(mut self, repositories: Vec<LiveRepository>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn with_access_policy(mut self, name: &str, text: &str) -> Self {
        self.access_policies
            .insert(name.to_owned(), text.to_owned());
        self
    }

    pub fn with_lifecycle_policy(mut self, name: &str, text: &str) -> Self {
        self.lifecycle_policies
            .insert(name.to_owned(), text.to_owned());
        self
    }

    pub fn with_tags(mut self, arn: &str, tags: TagSet) -> Self {
        self.tags.insert(arn.to_owned(), tags);
        self
    }

    pub fn with_failing_calls(mut self) -> Self {
        self.fail_calls = true;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn record(&self, operation: &str) -> Result<(), InspectorError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_calls {
            return Err(InspectorError::api(operation, "mock failure"));
        }
        Ok(())
    }

    fn policy(
        map: &std::collections::HashMap<String, String>,
        name: &str,
    ) -> Option<PolicyDocument> {
        map.get(name).map(|text| PolicyDocument {
            repository: name.to_owned(),
            text: text.clone(),
        })
    }
}

#[cfg(test)]
impl RegistryClient for MockRegistryClient {
    async fn describe_repositories(
        &self,
        names: &[String],
    ) -> Result<Vec<LiveRepository>, InspectorError> {
        self.record("DescribeRepositories")?;
        Ok(self
            .repositories
            .iter()
            .filter(|repo| names.contains(&repo.name))
            .cloned()
            .collect())
    }

    async fn get_repository_policy(
        &self,
        name: &str,
    ) -> Result<Option<PolicyDocument>, InspectorError> {
        self.record("GetRepositoryPolicy")?;
        Ok(Self::policy(&self.access_policies, name))
    }

    async fn get_lifecycle_policy(
        &self,
        name: &str,
    ) -> Result<Option<PolicyDocument>, InspectorError> {
        self.record("GetLifecyclePolicy")?;
        Ok(Self::policy(&self.lifecycle_policies, name))
    }

    async fn list_tags(&self, arn: &str) -> Result<TagSet, InspectorError> {
        self.record("ListTagsForResource")?;
        Ok(self.tags.get(arn).cloned().unwrap_or_default())
    }
}
