//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::config::AnalysisConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Model names the CLI knows how to build.
pub const KNOWN_MODELS: &[&str] = &["nk", "nk-latent", "lrc2"];

/// Upper bound on redundancy accepted from configuration.
pub const MAX_REDUNDANCY: u32 = 32;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate an analysis configuration semantically.
pub fn validate_config(config: &AnalysisConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if let Some(model) = &config.default_model {
        if !KNOWN_MODELS.contains(&model.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "default_model".to_string(),
                message: format!("Must be one of {}, got '{}'", KNOWN_MODELS.join(", "), model),
            });
        }
    }

    if config.redundancy > MAX_REDUNDANCY {
        return Err(ValidationError::InvalidValue {
            field: "redundancy".to_string(),
            message: format!("Must be at most {}, got {}", MAX_REDUNDANCY, config.redundancy),
        });
    }

    if config.exact_state_limit == 0 {
        return Err(ValidationError::InvalidValue {
            field: "exact_state_limit".to_string(),
            message: "Must be positive".to_string(),
        });
    }

    for (name, value) in &config.bindings {
        validate_variable_name(&format!("bindings.{}", name), name)?;
        if !value.is_finite() || *value <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("bindings.{}", name),
                message: format!("Rates and counts must be positive and finite, got {}", value),
            });
        }
    }

    let scale = config.compare_regime.fault_rate_scale;
    if !scale.is_finite() || scale <= 0.0 || scale > 1.0 {
        return Err(ValidationError::InvalidValue {
            field: "compare_regime.fault_rate_scale".to_string(),
            message: format!("Must be in (0, 1], got {}", scale),
        });
    }

    for name in &config.compare_regime.fault_variables {
        validate_variable_name("compare_regime.fault_variables", name)?;
    }

    Ok(())
}

fn validate_variable_name(field: &str, name: &str) -> ValidationResult<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("'{}' is not a valid variable name", name),
        })
    }
}
