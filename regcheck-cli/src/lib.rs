//! regcheck command-line driver.
//!
//! `main.rs` only parses arguments and maps the final error to an exit code;
//! everything else lives here so the command handlers can be tested with a
//! fake registry client.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

use std::path::Path;

use regcheck_core::config::RegcheckConfig;
use regcheck_core::error::{ConfigError, RegcheckError};
use tracing::debug;

use crate::cli::{Cli, Commands, DEFAULT_CONFIG_PATH};
use crate::error::CliError;
use crate::output::OutputWriter;

/// Load `regcheck.toml`, falling back to defaults when the default path is absent.
///
/// An explicitly given path that does not exist is still an error.
pub async fn load_config(path: &Path) -> Result<RegcheckConfig, CliError> {
    match RegcheckConfig::load(path).await {
        Ok(config) => Ok(config),
        Err(RegcheckError::Config(ConfigError::FileNotFound { .. }))
            if path == Path::new(DEFAULT_CONFIG_PATH) =>
        {
            debug!(path = %path.display(), "no configuration file, using defaults");
            let mut config = RegcheckConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => {
            // the file under test may be broken, so logging uses defaults here
            let mut general = RegcheckConfig::default().general;
            apply_log_level(&mut general, cli.log_level.as_deref());
            init_logging(&general)?;
            commands::config::execute(args, &cli.config, &writer).await
        }
        Commands::Verify(args) => {
            let config = prepare(&cli.config, cli.log_level.as_deref()).await?;
            commands::verify::execute(args, &config, &writer).await
        }
        Commands::Scenarios(args) => {
            let config = prepare(&cli.config, cli.log_level.as_deref()).await?;
            commands::scenarios::execute(args, &config, &writer)
        }
    }
}

async fn prepare(path: &Path, log_level: Option<&str>) -> Result<RegcheckConfig, CliError> {
    let mut config = load_config(path).await?;
    apply_log_level(&mut config.general, log_level);
    init_logging(&config.general)?;
    regcheck_core::metrics::describe_all();
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn apply_log_level(general: &mut regcheck_core::config::GeneralConfig, level: Option<&str>) {
    if let Some(level) = level {
        general.log_level = level.to_owned();
    }
}

fn init_logging(general: &regcheck_core::config::GeneralConfig) -> Result<(), CliError> {
    logging::init_tracing(general).map_err(|e| CliError::Config(format!("{e:#}")))
}
