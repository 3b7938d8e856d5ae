//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path →
//! system path → built-in defaults.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::validate::{validate_config, ValidationError, ValidationResult};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to the configuration file (or None if not found).
    pub config: Option<PathBuf>,

    /// Where the path came from (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/mttf/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "MTTF_CONFIG";
pub const ENV_CONFIG_DIR: &str = "MTTF_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "mttf.toml";

/// Application name for XDG and system directories.
const APP_NAME: &str = "mttf";

/// Resolve the configuration path.
///
/// 1. Explicit CLI path. Unlike the other sources it must exist.
/// 2. `MTTF_CONFIG`
/// 3. `MTTF_CONFIG_DIR` + `mttf.toml`
/// 4. XDG config directory (`~/.config/mttf/mttf.toml`)
/// 5. System config (`/etc/mttf/mttf.toml`)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ValidationResult<ConfigPaths> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ValidationError::IoError(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        return Ok(found(path.to_path_buf(), ConfigSource::CliArgument));
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(found(path, ConfigSource::Environment));
        }
        debug!(path = %path.display(), "MTTF_CONFIG points at a missing file, ignoring");
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return Ok(found(path, ConfigSource::Environment));
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return Ok(found(path, ConfigSource::XdgConfig));
        }
    }

    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return Ok(found(system_path, ConfigSource::SystemConfig));
    }

    Ok(ConfigPaths::default())
}

fn found(path: PathBuf, source: ConfigSource) -> ConfigPaths {
    debug!(path = %path.display(), source = %source, "resolved config file");
    ConfigPaths {
        config: Some(path),
        source,
    }
}

/// A resolved, parsed and validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AnalysisConfig,
    pub paths: ConfigPaths,
    /// File content, kept for the snapshot hash.
    pub raw: Option<String>,
}

/// Resolve, read, parse and validate the configuration.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    let paths = resolve_config(cli_path)?;
    let Some(path) = paths.config.clone() else {
        return Ok(LoadedConfig {
            config: AnalysisConfig::default(),
            paths,
            raw: None,
        });
    };

    let raw = std::fs::read_to_string(&path).map_err(|e| {
        ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let config = AnalysisConfig::parse_for_path(&path, &raw)?;
    validate_config(&config)?;

    Ok(LoadedConfig {
        config,
        paths,
        raw: Some(raw),
    })
}

/// Get the XDG config directory for mttf.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(format!("{}", ConfigSource::Environment), "environment variable");
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(format!("{}", ConfigSource::BuiltinDefault), "builtin default");
    }

    #[test]
    fn missing_cli_path_is_an_error() {
        let err = resolve_config(Some(Path::new("/nonexistent/mttf.toml"))).unwrap_err();
        assert_eq!(err.code(), 60);
    }

    #[test]
    fn test_xdg_config_dir() {
        if let Some(path) = xdg_config_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/mttf"));
    }
}
