//! Analysis configuration file types.
//!
//! The file is TOML by default; a `.json` extension selects JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::validate::{ValidationError, ValidationResult};

/// Top-level analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Model analysed when the CLI is not given one.
    #[serde(default)]
    pub default_model: Option<String>,

    /// Number of tolerated component failures for the built-in models.
    #[serde(default = "default_redundancy")]
    pub redundancy: u32,

    /// Largest internal state count the exact solver is run on.
    #[serde(default = "default_exact_state_limit")]
    pub exact_state_limit: usize,

    /// Numeric values for rate variables (`N`, `e`, `r`, ...).
    #[serde(default)]
    pub bindings: BTreeMap<String, f64>,

    #[serde(default)]
    pub compare_regime: CompareRegime,
}

/// Settings for comparing the exact and asymptotic estimates numerically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareRegime {
    /// Factor applied to every fault-rate binding before comparing.
    #[serde(default = "default_fault_rate_scale")]
    pub fault_rate_scale: f64,

    /// Variables treated as fault rates.
    #[serde(default = "default_fault_variables")]
    pub fault_variables: Vec<String>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_redundancy() -> u32 {
    2
}

fn default_exact_state_limit() -> usize {
    9
}

fn default_fault_rate_scale() -> f64 {
    1.0
}

fn default_fault_variables() -> Vec<String> {
    vec!["e".to_string(), "es".to_string()]
}

impl Default for CompareRegime {
    fn default() -> Self {
        CompareRegime {
            fault_rate_scale: default_fault_rate_scale(),
            fault_variables: default_fault_variables(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            schema_version: default_schema_version(),
            default_model: None,
            redundancy: default_redundancy(),
            exact_state_limit: default_exact_state_limit(),
            bindings: BTreeMap::new(),
            compare_regime: CompareRegime::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a file, choosing the parser by extension.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_for_path(path, &content)
    }

    /// Parse `text` as JSON when `path` has a `.json` extension, else TOML.
    pub fn parse_for_path(path: &Path, text: &str) -> ValidationResult<Self> {
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(text)
        } else {
            Self::from_toml(text)
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(text: &str) -> ValidationResult<Self> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(text: &str) -> ValidationResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Render as TOML, the format `mttf config show` prints.
    pub fn to_toml(&self) -> ValidationResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Cannot render TOML: {}", e)))
    }

    /// Bindings with fault-rate variables scaled for the comparison regime.
    pub fn regime_bindings(&self) -> BTreeMap<String, f64> {
        let scale = self.compare_regime.fault_rate_scale;
        self.bindings
            .iter()
            .map(|(name, value)| {
                if self.compare_regime.fault_variables.contains(name) {
                    (name.clone(), value * scale)
                } else {
                    (name.clone(), *value)
                }
            })
            .collect()
    }
}
