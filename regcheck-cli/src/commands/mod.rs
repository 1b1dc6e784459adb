//! Command handlers -- one module per subcommand

pub mod config;
pub mod scenarios;
pub mod verify;

use std::path::Path;

use regcheck_core::config::RegcheckConfig;
use regcheck_verifier::ScenarioCatalog;
use tracing::debug;

use crate::error::CliError;

/// Built-in scenarios plus the files under `scenario.definitions_dir`, if configured.
pub fn load_catalog(config: &RegcheckConfig) -> Result<ScenarioCatalog, CliError> {
    let mut catalog = ScenarioCatalog::builtin();

    let dir = config.scenario.definitions_dir.trim();
    if !dir.is_empty() {
        let loaded = catalog.load_dir(Path::new(dir))?;
        debug!(dir, loaded, total = catalog.len(), "scenario files loaded");
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_without_definitions_dir() {
        let catalog = load_catalog(&RegcheckConfig::default()).expect("builtin catalog");
        assert!(catalog.get("ecr").is_ok());
    }

    #[test]
    fn test_missing_definitions_dir_is_an_error() {
        let mut config = RegcheckConfig::default();
        config.scenario.definitions_dir = "/nonexistent/regcheck/scenarios".to_owned();
        let err = load_catalog(&config).expect_err("directory does not exist");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_definitions_dir_extends_catalog() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("fixed.toml"),
            "name = \"fixed_names\"\ntarget = { names = [\"ecr-test\"] }\n\n[[checks]]\nkind = \"existence\"\n",
        )
        .expect("write scenario");

        let mut config = RegcheckConfig::default();
        config.scenario.definitions_dir = dir.path().display().to_string();

        let catalog = load_catalog(&config).expect("catalog");
        assert!(catalog.get("fixed_names").is_ok());
        assert!(catalog.get("ecr").is_ok());
    }
}
