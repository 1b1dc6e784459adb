//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no I/O happens here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "regcheck.toml";

/// regcheck -- verify a provisioned container registry against its declared configuration.
///
/// Use `regcheck <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "regcheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to the regcheck.toml configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a verification scenario against the live registry.
    Verify(VerifyArgs),

    /// Inspect the scenario catalogue.
    Scenarios(ScenariosArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- verify ----

/// Run one scenario and report every sub-check.
#[derive(Args, Debug, Clone, Default)]
pub struct VerifyArgs {
    /// Scenario name (see `regcheck scenarios list`).
    pub scenario: String,

    /// Folder holding one variables directory per scenario (overrides scenario.config_folder).
    #[arg(long)]
    pub config_folder: Option<PathBuf>,

    /// Variables file name inside the scenario directory (overrides scenario.var_file_name).
    #[arg(long)]
    pub var_file: Option<String>,

    /// Directory under the config folder holding the variables file (default: scenario name).
    #[arg(long)]
    pub scenario_dir: Option<String>,

    /// `terraform output -json` file with the module outputs.
    #[arg(long)]
    pub outputs: Option<PathBuf>,
}

// ---- scenarios ----

/// Inspect built-in and file-defined scenarios.
#[derive(Args, Debug)]
pub struct ScenariosArgs {
    #[command(subcommand)]
    pub action: ScenariosAction,
}

#[derive(Subcommand, Debug)]
pub enum ScenariosAction {
    /// List every scenario in the catalogue.
    List,
    /// Show the checks of one scenario.
    Show {
        /// Scenario name.
        name: String,
    },
}

// ---- config ----

/// Manage configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file.
    Validate,
    /// Show the effective configuration.
    Show {
        /// Show only one section (general, aws, inspector, scenario).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_verify_minimal() {
        let cli = Cli::try_parse_from(["regcheck", "verify", "ecr"]).expect("should parse");
        assert_eq!(cli.config, PathBuf::from("regcheck.toml"));
        assert_eq!(cli.output, OutputFormat::Text);
        match cli.command {
            Commands::Verify(args) => {
                assert_eq!(args.scenario, "ecr");
                assert!(args.config_folder.is_none());
                assert!(args.outputs.is_none());
            }
            other => panic!("expected verify, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_verify_with_overrides() {
        let cli = Cli::try_parse_from([
            "regcheck",
            "-c",
            "/etc/regcheck.toml",
            "verify",
            "collection_ecr",
            "--config-folder",
            "modules/examples",
            "--var-file",
            "prod.tfvars",
            "--scenario-dir",
            "ecr",
            "--outputs",
            "outputs.json",
            "--output",
            "json",
        ])
        .expect("should parse");

        assert_eq!(cli.config, PathBuf::from("/etc/regcheck.toml"));
        assert_eq!(cli.output, OutputFormat::Json);
        let Commands::Verify(args) = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(args.config_folder, Some(PathBuf::from("modules/examples")));
        assert_eq!(args.var_file.as_deref(), Some("prod.tfvars"));
        assert_eq!(args.scenario_dir.as_deref(), Some("ecr"));
        assert_eq!(args.outputs, Some(PathBuf::from("outputs.json")));
    }

    #[test]
    fn test_parse_verify_requires_scenario() {
        assert!(Cli::try_parse_from(["regcheck", "verify"]).is_err());
    }

    #[test]
    fn test_parse_scenarios_show() {
        let cli = Cli::try_parse_from(["regcheck", "scenarios", "show", "ecr"]).expect("parse");
        match cli.command {
            Commands::Scenarios(ScenariosArgs {
                action: ScenariosAction::Show { name },
            }) => assert_eq!(name, "ecr"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_show_section_and_log_level() {
        let cli = Cli::try_parse_from([
            "regcheck",
            "config",
            "show",
            "--section",
            "aws",
            "--log-level",
            "debug",
        ])
        .expect("parse");
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("aws")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_output_format() {
        assert!(Cli::try_parse_from(["regcheck", "--output", "yaml", "scenarios", "list"]).is_err());
    }
}
