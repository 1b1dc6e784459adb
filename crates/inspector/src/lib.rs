#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`InspectorError`)
//! - [`config`]: Inspector configuration (`ResourceInspectorConfig`, builder)
//! - [`client`]: Registry API abstraction (`RegistryClient` trait, identifier validation)
//! - [`ecr`]: Production client (`EcrRegistryClient`)
//! - [`inspector`]: Lookup entry point with retry (`ResourceInspector`)

pub mod client;
pub mod config;
pub mod ecr;
pub mod error;
pub mod inspector;

// --- Public API Re-exports ---

pub use client::{RegistryClient, validate_arn, validate_repository_name};
pub use config::{ResourceInspectorConfig, ResourceInspectorConfigBuilder};
pub use ecr::EcrRegistryClient;
pub use error::InspectorError;
pub use inspector::ResourceInspector;
