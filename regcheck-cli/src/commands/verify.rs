//! `regcheck verify` command handler

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use regcheck_core::config::RegcheckConfig;
use regcheck_core::report::ScenarioReport;
use regcheck_inspector::{
    EcrRegistryClient, RegistryClient, ResourceInspector, ResourceInspectorConfig,
};
use regcheck_verifier::{ScenarioLocation, ScenarioRunner, ScenarioSpec, TerraformContext};

use crate::cli::VerifyArgs;
use crate::commands::load_catalog;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `verify` command against ECR.
///
/// Exits with [`CliError::ScenarioFailed`] when any sub-check failed; the
/// report is rendered first either way.
pub async fn execute(
    args: VerifyArgs,
    config: &RegcheckConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let client = EcrRegistryClient::connect(&config.aws).await?;
    let report = run_scenario(&args, config, Arc::new(client)).await?;

    writer.render(&report)?;
    ensure_passed(&report)
}

/// Build the context and inspector, then run the named scenario with `client`.
pub async fn run_scenario<C: RegistryClient>(
    args: &VerifyArgs,
    config: &RegcheckConfig,
    client: Arc<C>,
) -> Result<ScenarioReport, CliError> {
    let catalog = load_catalog(config)?;
    let spec = catalog.get(&args.scenario)?;
    let context = build_context(args, config, spec)?;

    let inspector_config = ResourceInspectorConfig::from_core(&config.inspector);
    inspector_config.validate()?;
    let runner = ScenarioRunner::new(ResourceInspector::new(client).with_config(inspector_config));

    info!(
        scenario = %spec.name,
        variables = %context.declared().path(),
        checks = spec.checks.len(),
        "running scenario"
    );
    let report = runner.run(spec, &context).await?;
    info!(
        scenario = %report.scenario,
        run_id = %report.run_id,
        passed = report.passed_count(),
        failed = report.failed_count(),
        "scenario finished"
    );
    Ok(report)
}

/// Map a finished report to the command result.
pub fn ensure_passed(report: &ScenarioReport) -> Result<(), CliError> {
    if report.passed() {
        Ok(())
    } else {
        Err(CliError::ScenarioFailed {
            scenario: report.scenario.clone(),
            failed: report.failed_count(),
            total: report.outcomes.len(),
        })
    }
}

/// Resolve the variables file location and outputs file for one run.
fn build_context(
    args: &VerifyArgs,
    config: &RegcheckConfig,
    spec: &ScenarioSpec,
) -> Result<TerraformContext, CliError> {
    let config_folder = args
        .config_folder
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.scenario.config_folder));
    let var_file = args
        .var_file
        .clone()
        .unwrap_or_else(|| config.scenario.var_file_name.clone());
    if var_file.is_empty() || var_file.contains(['/', '\\']) {
        return Err(CliError::Config(format!(
            "--var-file must be a plain file name, got '{var_file}'"
        )));
    }
    let scenario_dir = args
        .scenario_dir
        .clone()
        .unwrap_or_else(|| spec.name.clone());

    let location = ScenarioLocation::new(config_folder, scenario_dir, var_file);
    let context = TerraformContext::load(location).map_err(regcheck_verifier::VerifierError::from)?;

    match &args.outputs {
        Some(path) => Ok(context
            .with_outputs_file(path)
            .map_err(regcheck_verifier::VerifierError::from)?),
        None => Ok(context),
    }
}

impl Render for ScenarioReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scenario: {} (run {})", self.scenario.bold(), self.run_id)?;
        if self.targets.is_empty() {
            writeln!(w, "  Targets: (none)")?;
        } else {
            writeln!(w, "  Targets: {}", self.targets.join(", "))?;
        }
        writeln!(w)?;

        for outcome in &self.outcomes {
            if outcome.is_passed() {
                writeln!(
                    w,
                    "  {} {}: {}",
                    "PASS".green().bold(),
                    outcome.name,
                    outcome.message
                )?;
            } else {
                let kind = outcome
                    .failure
                    .map(|k| format!(" [{k}]"))
                    .unwrap_or_default();
                writeln!(
                    w,
                    "  {} {}{}: {}",
                    "FAIL".red().bold(),
                    outcome.name,
                    kind.yellow(),
                    outcome.message
                )?;
            }
            if let (Some(expected), Some(actual)) = (&outcome.expected, &outcome.actual) {
                writeln!(w, "       expected: {expected}")?;
                writeln!(w, "       actual:   {actual}")?;
            }
        }

        writeln!(w)?;
        let summary = self.to_string();
        if self.passed() {
            writeln!(w, "Result: {}", summary.green().bold())?;
        } else {
            writeln!(w, "Result: {}", summary.red().bold())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regcheck_core::report::{CheckOutcome, FailureKind};

    fn report(outcomes: Vec<CheckOutcome>) -> ScenarioReport {
        let now = chrono::Utc::now();
        ScenarioReport {
            scenario: "ecr".to_owned(),
            run_id: uuid::Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            targets: vec!["ecr-test".to_owned()],
            outcomes,
        }
    }

    fn render(report: &ScenarioReport) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_render_passed_report() {
        let r = report(vec![
            CheckOutcome::passed("existence", "found 1 of 1 repositories")
                .with_values("1", "1"),
            CheckOutcome::passed("tags_present", "2 tags on every repository"),
        ]);
        let text = render(&r);
        assert!(text.contains("Scenario: ecr"));
        assert!(text.contains("Targets: ecr-test"));
        assert!(text.contains("PASS existence"));
        assert!(text.contains("expected: 1"));
        assert!(text.contains("Result: ecr: 2/2 sub-checks passed"));
        assert!(ensure_passed(&r).is_ok());
    }

    #[test]
    fn test_render_failed_report_shows_kind() {
        let r = report(vec![
            CheckOutcome::passed("existence", "found 1 of 1 repositories"),
            CheckOutcome::failed(
                "lifecycle_policy",
                FailureKind::ResourceAbsent,
                "ecr-test has no lifecycle policy",
            ),
        ]);
        let text = render(&r);
        assert!(text.contains("FAIL lifecycle_policy [resource_absent]"));
        assert!(text.contains("1/2 sub-checks passed"));

        let err = ensure_passed(&r).expect_err("one check failed");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_render_without_targets() {
        let mut r = report(vec![CheckOutcome::failed(
            "existence",
            FailureKind::ExpectationMismatch,
            "expected 1 repositories, found 0",
        )]);
        r.targets.clear();
        assert!(render(&r).contains("Targets: (none)"));
    }

    #[test]
    fn test_var_file_must_be_plain_name() {
        let args = VerifyArgs {
            scenario: "ecr".to_owned(),
            var_file: Some("../secret.tfvars".to_owned()),
            ..VerifyArgs::default()
        };
        let config = RegcheckConfig::default();
        let catalog = load_catalog(&config).expect("catalog");
        let spec = catalog.get("ecr").expect("builtin");
        let err = build_context(&args, &config, spec).expect_err("path separators rejected");
        assert_eq!(err.exit_code(), 2);
    }
}
