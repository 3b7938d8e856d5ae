//! MTTF analysis configuration loading and validation.
//!
//! This crate provides:
//! - The typed `AnalysisConfig` file format (TOML or JSON)
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation
//! - Config snapshots recorded alongside analysis results

pub mod config;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use config::{AnalysisConfig, CompareRegime};
pub use resolve::{load_config, resolve_config, ConfigPaths, ConfigSource, LoadedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
