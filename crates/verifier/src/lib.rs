#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`VerifierError`)
//! - [`value`]: Variable and output values (`TfValue`)
//! - [`tfvars`]: Variables file parser
//! - [`declared`]: Declared-configuration reader (`ScenarioLocation`, `DeclaredConfigReader`)
//! - [`context`]: Provisioning context (`ProvisioningContext`, `TerraformContext`)
//! - [`expectation`]: Check tables (`ScenarioSpec`, `CheckSpec`)
//! - [`runner`]: Scenario state machine (`ScenarioRunner`)
//! - [`scenarios`]: Built-in catalogue and scenario files (`ScenarioCatalog`)
//!
//! # Architecture
//!
//! ```text
//! ProvisioningContext --> FetchDeclared --> ResourceInspector.describe()
//!                                                  |
//!                                       Evaluate(CheckSpec...) --> ScenarioReport
//! ```

pub mod context;
pub mod declared;
pub mod error;
pub mod expectation;
pub mod runner;
pub mod scenarios;
pub mod tfvars;
pub mod value;

// --- Public API Re-exports ---

pub use context::{ProvisioningContext, TerraformContext, load_outputs_file, parse_outputs};
pub use declared::{DeclaredConfig, DeclaredConfigReader, ScenarioLocation};
pub use error::VerifierError;
pub use expectation::{CheckSpec, ScenarioSpec, TargetSource, ValueSource};
pub use runner::ScenarioRunner;
pub use scenarios::{ScenarioCatalog, load_scenario_from_file, load_scenarios_from_dir};
pub use tfvars::{TfvarsError, parse_tfvars};
pub use value::TfValue;
