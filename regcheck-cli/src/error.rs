//! CLI-specific error types and exit code mapping

use regcheck_core::error::RegcheckError;
use regcheck_inspector::InspectorError;
use regcheck_verifier::VerifierError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// At least one sub-check of the scenario failed.
    #[error("scenario '{scenario}' failed: {failed} of {total} sub-checks failed")]
    ScenarioFailed {
        scenario: String,
        failed: usize,
        total: usize,
    },

    /// The scenario aborted before evaluation (missing variable, missing target output).
    #[error("scenario aborted: {0}")]
    Declared(String),

    /// The provider client could not be built.
    #[error("provider client error: {0}")]
    Provider(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from regcheck-core.
    #[error("{0}")]
    Core(#[from] RegcheckError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | Scenario failed / general command error   |
    /// | 2    | Configuration error                       |
    /// | 3    | Declared configuration abort              |
    /// | 4    | Provider client construction failure      |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Declared(_) => 3,
            Self::Provider(_) => 4,
            Self::Io(_) => 10,
            Self::Core(core) => match core {
                RegcheckError::Config(_) => 2,
                RegcheckError::Declared(_) => 3,
                RegcheckError::Provider(_) => 4,
                RegcheckError::Io(_) => 10,
                RegcheckError::Scenario(_) => 1,
            },
            Self::ScenarioFailed { .. } | Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<VerifierError> for CliError {
    fn from(e: VerifierError) -> Self {
        match e {
            VerifierError::Declared(inner) => Self::Declared(inner.to_string()),
            other => Self::Command(other.to_string()),
        }
    }
}

impl From<InspectorError> for CliError {
    fn from(e: InspectorError) -> Self {
        match e {
            InspectorError::Connection(reason) => Self::Provider(reason),
            InspectorError::Config { field, reason } => Self::Config(format!("{field}: {reason}")),
            other => Self::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regcheck_core::error::{ConfigError, DeclaredConfigError, ScenarioError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("bad region".to_owned());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_scenario_failed() {
        let err = CliError::ScenarioFailed {
            scenario: "ecr".to_owned(),
            failed: 1,
            total: 4,
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "scenario 'ecr' failed: 1 of 4 sub-checks failed"
        );
    }

    #[test]
    fn test_exit_code_io_error() {
        let err = CliError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_declared_abort_maps_to_three() {
        let err: CliError = VerifierError::from(DeclaredConfigError::ConfigVariableNotFound {
            variable: "name".to_owned(),
            path: "examples/ecr/test.tfvars".to_owned(),
        })
        .into();
        assert!(matches!(err, CliError::Declared(_)));
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_unknown_scenario_is_command_error() {
        let err: CliError = VerifierError::ScenarioNotFound("lambda".to_owned()).into();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("lambda"));
    }

    #[test]
    fn test_connection_failure_maps_to_four() {
        let err: CliError = InspectorError::Connection("no region".to_owned()).into();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_inspector_config_failure_maps_to_two() {
        let err: CliError = InspectorError::Config {
            field: "retry_max_attempts".to_owned(),
            reason: "must be 0-10".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_core_error_exit_codes() {
        let cases = [
            (
                RegcheckError::Config(ConfigError::FileNotFound {
                    path: "regcheck.toml".to_owned(),
                }),
                2,
            ),
            (
                RegcheckError::Declared(DeclaredConfigError::OutputNotFound {
                    output: "repository_name".to_owned(),
                }),
                3,
            ),
            (
                RegcheckError::Scenario(ScenarioError::NotFound("x".to_owned())),
                1,
            ),
        ];
        for (core, expected) in cases {
            assert_eq!(CliError::from(core).exit_code(), expected);
        }
    }
}
