//! `regcheck scenarios` command handler

use std::io::Write;

use serde::Serialize;

use regcheck_core::config::RegcheckConfig;
use regcheck_verifier::{CheckSpec, ScenarioSpec, TargetSource};

use crate::cli::{ScenariosAction, ScenariosArgs};
use crate::commands::load_catalog;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scenarios` command.
pub fn execute(
    args: ScenariosArgs,
    config: &RegcheckConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let catalog = load_catalog(config)?;
    match args.action {
        ScenariosAction::List => {
            let list = ScenarioList {
                scenarios: catalog.iter().map(ScenarioSummary::from).collect(),
            };
            writer.render(&list)
        }
        ScenariosAction::Show { name } => {
            let spec = catalog.get(&name)?;
            writer.render(&ScenarioDetail::from(spec))
        }
    }
}

/// Render the target source the way check tables reference values.
fn describe_target(target: &TargetSource) -> String {
    match target {
        TargetSource::Declared(var) => format!("var.{var}"),
        TargetSource::Output(name) => format!("output.{name}"),
        TargetSource::Names(names) => format!("[{}]", names.join(", ")),
    }
}

/// One line of `scenarios list`.
#[derive(Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub description: String,
    pub target: String,
    pub checks: usize,
}

impl From<&ScenarioSpec> for ScenarioSummary {
    fn from(spec: &ScenarioSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            target: describe_target(&spec.target),
            checks: spec.checks.len(),
        }
    }
}

#[derive(Serialize)]
pub struct ScenarioList {
    pub scenarios: Vec<ScenarioSummary>,
}

impl Render for ScenarioList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.scenarios.is_empty() {
            return writeln!(w, "No scenarios defined.");
        }

        let width = self
            .scenarios
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0);
        writeln!(w, "Scenarios ({}):", self.scenarios.len())?;
        for s in &self.scenarios {
            writeln!(
                w,
                "  {:<width$}  {} checks  target {}",
                s.name.bold(),
                s.checks,
                s.target
            )?;
            if !s.description.is_empty() {
                writeln!(w, "  {:<width$}  {}", "", s.description.dimmed())?;
            }
        }
        Ok(())
    }
}

/// Full definition shown by `scenarios show`.
#[derive(Serialize)]
pub struct ScenarioDetail {
    pub name: String,
    pub description: String,
    pub target: String,
    pub declared_variables: Vec<String>,
    pub checks: Vec<CheckLine>,
}

#[derive(Serialize)]
pub struct CheckLine {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl From<&CheckSpec> for CheckLine {
    fn from(check: &CheckSpec) -> Self {
        let expected = match check {
            CheckSpec::OutputMatches {
                output, pattern, ..
            } => Some(format!("output.{output} =~ /{pattern}/")),
            other => other.value_source().map(ToString::to_string),
        };
        Self {
            name: check.report_name(),
            kind: check.kind().to_owned(),
            expected,
        }
    }
}

impl From<&ScenarioSpec> for ScenarioDetail {
    fn from(spec: &ScenarioSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            target: describe_target(&spec.target),
            declared_variables: spec
                .declared_variables()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            checks: spec.checks.iter().map(CheckLine::from).collect(),
        }
    }
}

impl Render for ScenarioDetail {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scenario: {}", self.name.bold())?;
        if !self.description.is_empty() {
            writeln!(w, "  {}", self.description)?;
        }
        writeln!(w, "  Target: {}", self.target)?;
        if !self.declared_variables.is_empty() {
            writeln!(w, "  Variables: {}", self.declared_variables.join(", "))?;
        }
        writeln!(w)?;
        for (index, check) in self.checks.iter().enumerate() {
            write!(w, "  {}. {} ({})", index + 1, check.name, check.kind.cyan())?;
            match &check.expected {
                Some(expected) => writeln!(w, " expected {expected}")?,
                None => writeln!(w)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regcheck_verifier::ScenarioCatalog;

    fn text<T: Render>(payload: &T) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        payload.render_text(&mut buffer).expect("render");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_list_contains_builtins() {
        let catalog = ScenarioCatalog::builtin();
        let list = ScenarioList {
            scenarios: catalog.iter().map(ScenarioSummary::from).collect(),
        };
        let output = text(&list);
        assert!(output.contains("Scenarios (3):"));
        assert!(output.contains("composable_complete"));
        assert!(output.contains("target var.repository_names"));
    }

    #[test]
    fn test_empty_list() {
        let list = ScenarioList {
            scenarios: Vec::new(),
        };
        assert_eq!(text(&list), "No scenarios defined.\n");
    }

    #[test]
    fn test_detail_of_collection_scenario() {
        let catalog = ScenarioCatalog::builtin();
        let detail = ScenarioDetail::from(catalog.get("collection_ecr").expect("builtin"));
        assert_eq!(detail.target, "var.name");
        assert_eq!(detail.checks.len(), 5);

        let identity = detail
            .checks
            .iter()
            .find(|c| c.kind == "identity")
            .expect("identity check");
        assert_eq!(identity.expected.as_deref(), Some("output.repository_name"));

        let output = text(&detail);
        assert!(output.contains("Scenario: collection_ecr"));
        assert!(output.contains("1. existence (existence)"));
        assert!(output.contains("expected output.repository_name"));
    }

    #[test]
    fn test_output_match_line() {
        let line = CheckLine::from(&CheckSpec::OutputMatches {
            name: None,
            output: "repository_url".to_owned(),
            pattern: "^[0-9]{12}\\.dkr".to_owned(),
        });
        assert_eq!(line.name, "output_matches:repository_url");
        assert_eq!(
            line.expected.as_deref(),
            Some("output.repository_url =~ /^[0-9]{12}\\.dkr/")
        );
    }

    #[test]
    fn test_fixed_names_target() {
        assert_eq!(
            describe_target(&TargetSource::Names(vec!["a".to_owned(), "b".to_owned()])),
            "[a, b]"
        );
    }

    #[test]
    fn test_detail_json() {
        let catalog = ScenarioCatalog::builtin();
        let detail = ScenarioDetail::from(catalog.get("ecr").expect("builtin"));
        let json = serde_json::to_value(&detail).expect("serialize");
        assert_eq!(json["name"], "ecr");
        assert_eq!(json["checks"].as_array().expect("array").len(), 4);
        assert!(json["checks"][0].get("expected").is_none());
    }
}
