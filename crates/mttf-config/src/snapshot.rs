//! Configuration snapshots recorded alongside analysis results.
//!
//! A snapshot pins down which configuration produced a result, so reports can
//! be compared and reproduced later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AnalysisConfig;
use crate::resolve::{ConfigPaths, ConfigSource};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Source of the configuration.
    pub config_source: String,

    /// SHA-256 of the raw file content, or of the canonical defaults.
    pub config_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub default_model: Option<String>,
    pub redundancy: u32,
    pub exact_state_limit: usize,
    pub bound_variables: Vec<String>,
    pub fault_rate_scale: f64,
}

impl ConfigSnapshot {
    /// Create a snapshot from a loaded configuration and its raw text.
    pub fn new(config: &AnalysisConfig, paths: &ConfigPaths, raw: Option<&str>) -> Self {
        let config_hash = match raw {
            Some(text) => hash_content(text),
            None => hash_content("defaults"),
        };

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_path: paths.config.as_ref().map(|p| p.display().to_string()),
            config_source: paths.source.to_string(),
            config_hash,
            summary: ConfigSummary::from(config),
        }
    }

    /// Create a snapshot with only defaults (no config file loaded).
    pub fn defaults_only() -> Self {
        let paths = ConfigPaths {
            config: None,
            source: ConfigSource::BuiltinDefault,
        };
        Self::new(&AnalysisConfig::default(), &paths, None)
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same config content).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

impl From<&AnalysisConfig> for ConfigSummary {
    fn from(config: &AnalysisConfig) -> Self {
        ConfigSummary {
            default_model: config.default_model.clone(),
            redundancy: config.redundancy,
            exact_state_limit: config.exact_state_limit,
            bound_variables: config.bindings.keys().cloned().collect(),
            fault_rate_scale: config.compare_regime.fault_rate_scale,
        }
    }
}

/// Compute SHA-256 hash of content.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content() {
        let hash = hash_content("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_content("test"));
        assert_ne!(hash, hash_content("test2"));
    }

    #[test]
    fn test_defaults_snapshot() {
        let snapshot = ConfigSnapshot::defaults_only();
        assert_eq!(snapshot.schema_version, crate::CONFIG_SCHEMA_VERSION);
        assert_eq!(snapshot.config_source, "builtin default");
        assert!(snapshot.config_path.is_none());
        assert_eq!(snapshot.short_id().len(), 12);
        assert!(snapshot.matches(&ConfigSnapshot::defaults_only()));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = ConfigSnapshot::defaults_only();
        let json = snapshot.to_json().unwrap();
        let parsed = ConfigSnapshot::from_json(&json).unwrap();
        assert!(snapshot.matches(&parsed));
        assert_eq!(parsed.summary, snapshot.summary);
    }
}
