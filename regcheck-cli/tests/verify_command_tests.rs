//! Integration tests for `regcheck verify` with an in-memory registry.

use std::fs;
use std::sync::Arc;

use regcheck_cli::cli::VerifyArgs;
use regcheck_cli::commands::verify::{ensure_passed, run_scenario};
use regcheck_core::config::RegcheckConfig;
use regcheck_core::report::FailureKind;
use regcheck_core::types::{LiveRepository, PolicyDocument, TagSet};
use regcheck_inspector::{InspectorError, RegistryClient};
use tempfile::TempDir;

/// Registry holding fully configured repositories.
#[derive(Default)]
struct InMemoryRegistry {
    names: Vec<String>,
    lifecycle: bool,
}

impl InMemoryRegistry {
    fn with(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| (*n).to_owned()).collect(),
            lifecycle: true,
        }
    }
}

impl RegistryClient for InMemoryRegistry {
    async fn describe_repositories(
        &self,
        names: &[String],
    ) -> Result<Vec<LiveRepository>, InspectorError> {
        Ok(self
            .names
            .iter()
            .filter(|n| names.contains(n))
            .map(|name| LiveRepository {
                name: name.clone(),
                arn: format!("arn:aws:ecr:us-east-2:123456789012:repository/{name}"),
                uri: format!("123456789012.dkr.ecr.us-east-2.amazonaws.com/{name}"),
                registry_id: "123456789012".to_owned(),
                image_tag_mutability: Some("MUTABLE".to_owned()),
                scan_on_push: false,
            })
            .collect())
    }

    async fn get_repository_policy(
        &self,
        name: &str,
    ) -> Result<Option<PolicyDocument>, InspectorError> {
        Ok(Some(PolicyDocument {
            repository: name.to_owned(),
            text: r#"{"Version":"2012-10-17","Statement":[]}"#.to_owned(),
        }))
    }

    async fn get_lifecycle_policy(
        &self,
        name: &str,
    ) -> Result<Option<PolicyDocument>, InspectorError> {
        Ok(self.lifecycle.then(|| PolicyDocument {
            repository: name.to_owned(),
            text: r#"{"rules":[]}"#.to_owned(),
        }))
    }

    async fn list_tags(&self, _arn: &str) -> Result<TagSet, InspectorError> {
        Ok(TagSet::from([("Environment".to_owned(), "test".to_owned())]))
    }
}

/// `<tmp>/<dir>/test.tfvars` plus a config pointing at `<tmp>`.
fn workspace(dir: &str, tfvars: &str) -> (TempDir, RegcheckConfig) {
    let temp_dir = TempDir::new().expect("temp dir");
    fs::create_dir_all(temp_dir.path().join(dir)).expect("scenario dir");
    fs::write(temp_dir.path().join(dir).join("test.tfvars"), tfvars).expect("tfvars");

    let mut config = RegcheckConfig::default();
    config.scenario.config_folder = temp_dir.path().display().to_string();
    (temp_dir, config)
}

fn args(scenario: &str) -> VerifyArgs {
    VerifyArgs {
        scenario: scenario.to_owned(),
        ..VerifyArgs::default()
    }
}

#[tokio::test]
async fn test_verify_ecr_passes() {
    let (_dir, config) = workspace("ecr", "name = \"ecr-test\"\n");

    let report = run_scenario(&args("ecr"), &config, Arc::new(InMemoryRegistry::with(&["ecr-test"])))
        .await
        .expect("scenario runs");

    assert_eq!(report.to_string(), "ecr: 4/4 sub-checks passed");
    assert!(ensure_passed(&report).is_ok());
}

#[tokio::test]
async fn test_verify_reports_missing_lifecycle_policy() {
    let (_dir, config) = workspace("ecr", "name = \"ecr-test\"\n");
    let registry = InMemoryRegistry {
        lifecycle: false,
        ..InMemoryRegistry::with(&["ecr-test"])
    };

    let report = run_scenario(&args("ecr"), &config, Arc::new(registry))
        .await
        .expect("scenario runs");

    let lifecycle = report.outcome("lifecycle_policy").expect("lifecycle outcome");
    assert_eq!(lifecycle.failure, Some(FailureKind::ResourceAbsent));
    assert_eq!(report.passed_count(), 3);

    let err = ensure_passed(&report).expect_err("scenario failed");
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_verify_scenario_dir_and_outputs_overrides() {
    let (dir, config) = workspace("shared", "name = \"registry-7421\"\n");
    let outputs = dir.path().join("outputs.json");
    fs::write(
        &outputs,
        r#"{"repository_name": {"sensitive": false, "type": "string", "value": "registry-7421"}}"#,
    )
    .expect("outputs");

    let verify = VerifyArgs {
        scenario: "collection_ecr".to_owned(),
        scenario_dir: Some("shared".to_owned()),
        outputs: Some(outputs),
        ..VerifyArgs::default()
    };
    let report = run_scenario(&verify, &config, Arc::new(InMemoryRegistry::with(&["registry-7421"])))
        .await
        .expect("scenario runs");

    assert!(report.passed(), "{report:?}");
    assert_eq!(report.outcomes.len(), 5);
}

#[tokio::test]
async fn test_verify_missing_variable_exits_with_three() {
    let (_dir, config) = workspace("ecr", "tags = { Environment = \"test\" }\n");

    let err = run_scenario(&args("ecr"), &config, Arc::new(InMemoryRegistry::with(&["ecr-test"])))
        .await
        .expect_err("name is not declared");

    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("name"));
}

#[tokio::test]
async fn test_verify_missing_variables_file_exits_with_three() {
    let (_dir, config) = workspace("ecr", "name = \"ecr-test\"\n");

    let err = run_scenario(
        &args("composable_complete"),
        &config,
        Arc::new(InMemoryRegistry::default()),
    )
    .await
    .expect_err("no composable_complete directory");

    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_verify_unknown_scenario() {
    let (_dir, config) = workspace("ecr", "name = \"ecr-test\"\n");

    let err = run_scenario(&args("lambda"), &config, Arc::new(InMemoryRegistry::default()))
        .await
        .expect_err("unknown scenario");

    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("lambda"));
}
