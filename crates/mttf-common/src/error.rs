//! Error types for MTTF analysis.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Malformed State Graph
//!   Reason: malformed state graph: state (3) is not reachable from the root by fault edges
//!   Fix: Every internal state must be reachable from the root through fault transitions...
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 21,
//!   "category": "model",
//!   "message": "malformed state graph: ...",
//!   "recoverable": true,
//!   "suggested_action": "fix_model"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for MTTF operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Model selection and state-graph structure errors.
    Model,
    /// Solver and evaluation errors.
    Analysis,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Model => write!(f, "model"),
            ErrorCategory::Analysis => write!(f, "analysis"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for automation reacting to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Run `mttf config validate`.
    RunCheck,
    /// Fix the model definition or its parameters.
    FixModel,
    /// Supply numeric values for the free variables.
    BindVariables,
    /// Use a smaller model or skip the exact solver.
    ReduceModel,
    /// Retry the operation.
    Retry,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::FixModel => write!(f, "fix_model"),
            SuggestedAction::BindVariables => write!(f, "bind_variables"),
            SuggestedAction::ReduceModel => write!(f, "reduce_model"),
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for MTTF analysis.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    // Model errors (20-29)
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("malformed state graph: {0}")]
    MalformedGraph(String),

    #[error("unknown model '{name}'")]
    UnknownModel { name: String },

    #[error("invalid redundancy {redundancy}: {reason}")]
    InvalidRedundancy { redundancy: u32, reason: String },

    // Analysis errors (30-39)
    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("degenerate solve: {0}")]
    DegenerateSolve(String),

    #[error("evaluation failed: {0}")]
    Evaluation(String),

    #[error("model has {states} internal states, exact solver limit is {limit}")]
    StateLimitExceeded { states: usize, limit: usize },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Model errors
    /// - 30-39: Analysis errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig(_) => 11,
            Error::SchemaValidation(_) => 12,
            Error::InvalidModel(_) => 20,
            Error::MalformedGraph(_) => 21,
            Error::UnknownModel { .. } => 22,
            Error::InvalidRedundancy { .. } => 23,
            Error::Analysis(_) => 30,
            Error::DegenerateSolve(_) => 31,
            Error::Evaluation(_) => 32,
            Error::StateLimitExceeded { .. } => 33,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) | Error::SchemaValidation(_) => {
                ErrorCategory::Config
            }

            Error::InvalidModel(_)
            | Error::MalformedGraph(_)
            | Error::UnknownModel { .. }
            | Error::InvalidRedundancy { .. } => ErrorCategory::Model,

            Error::Analysis(_)
            | Error::DegenerateSolve(_)
            | Error::Evaluation(_)
            | Error::StateLimitExceeded { .. } => ErrorCategory::Analysis,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error can be resolved by changing the input.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) | Error::SchemaValidation(_) => true,

            Error::InvalidModel(_) => true,
            Error::MalformedGraph(_) => true,
            Error::UnknownModel { .. } => true,
            Error::InvalidRedundancy { .. } => true,

            // A singular generator or empty terminal flow is a property of the
            // model itself; rerunning cannot change it.
            Error::Analysis(_) => false,
            Error::DegenerateSolve(_) => false,
            Error::Evaluation(_) => true,
            Error::StateLimitExceeded { .. } => true,

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns the suggested action for automation.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) | Error::SchemaValidation(_) => {
                SuggestedAction::RunCheck
            }

            Error::InvalidModel(_)
            | Error::MalformedGraph(_)
            | Error::UnknownModel { .. }
            | Error::InvalidRedundancy { .. } => SuggestedAction::FixModel,

            Error::Analysis(_) | Error::DegenerateSolve(_) => SuggestedAction::FixModel,
            Error::Evaluation(_) => SuggestedAction::BindVariables,
            Error::StateLimitExceeded { .. } => SuggestedAction::ReduceModel,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Run 'mttf config validate' to check the configuration file.",
            Error::InvalidConfig(_) => {
                "Check the TOML/JSON syntax of the configuration file, or remove it to use defaults."
            }
            Error::SchemaValidation(_) => {
                "Set schema_version in the configuration file to a supported version."
            }

            Error::InvalidModel(_) => "Check the model parameters passed to 'mttf analyze'.",
            Error::MalformedGraph(_) => {
                "Every internal state must be reachable from the root through fault transitions, and every transition must target a registered state."
            }
            Error::UnknownModel { .. } => "Use one of the built-in models: nk, nk-latent, lrc2.",
            Error::InvalidRedundancy { .. } => {
                "Choose a redundancy that the model's component count can support."
            }

            Error::Analysis(_) => {
                "The model violates a structural invariant of the analysis. Inspect it with '--show-graph'."
            }
            Error::DegenerateSolve(_) => {
                "Some state cannot reach an absorbing state, or a reachable state has no recovery. Check the rates of the model."
            }
            Error::Evaluation(_) => {
                "Bind every free variable with '--bind name=value' or in the configuration file."
            }
            Error::StateLimitExceeded { .. } => {
                "Raise exact_state_limit in the configuration, or pass '--no-exact' and use the asymptotic estimate."
            }

            Error::Io(_) => "Check that the file exists and is readable, then retry.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq .' or regenerate the file.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig(_) => "Invalid Configuration File",
            Error::SchemaValidation(_) => "Schema Validation Failed",

            Error::InvalidModel(_) => "Invalid Model",
            Error::MalformedGraph(_) => "Malformed State Graph",
            Error::UnknownModel { .. } => "Unknown Model",
            Error::InvalidRedundancy { .. } => "Invalid Redundancy",

            Error::Analysis(_) => "Analysis Error",
            Error::DegenerateSolve(_) => "Degenerate Solve",
            Error::Evaluation(_) => "Evaluation Error",
            Error::StateLimitExceeded { .. } => "Model Too Large For Exact Solver",

            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for automation.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g. model name, limits).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::UnknownModel { name } => {
                context.insert("model".to_string(), serde_json::json!(name));
            }
            Error::InvalidRedundancy { redundancy, .. } => {
                context.insert("redundancy".to_string(), serde_json::json!(redundancy));
            }
            Error::StateLimitExceeded { states, limit } => {
                context.insert("states".to_string(), serde_json::json!(states));
                context.insert("limit".to_string(), serde_json::json!(limit));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("test".into()).code(), 10);
        assert_eq!(Error::MalformedGraph("x".into()).code(), 21);
        assert_eq!(Error::StateLimitExceeded { states: 80, limit: 40 }.code(), 33);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(Error::Config("test".into()).category(), ErrorCategory::Config);
        assert_eq!(
            Error::UnknownModel { name: "raid".into() }.category(),
            ErrorCategory::Model
        );
        assert_eq!(Error::DegenerateSolve("x".into()).category(), ErrorCategory::Analysis);
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::Evaluation("x".into()).is_recoverable());
        assert!(!Error::DegenerateSolve("x".into()).is_recoverable());
        assert!(!Error::Analysis("x".into()).is_recoverable());
    }

    #[test]
    fn test_suggested_action() {
        assert_eq!(
            Error::Evaluation("unbound e".into()).suggested_action(),
            SuggestedAction::BindVariables
        );
        assert_eq!(
            Error::StateLimitExceeded { states: 80, limit: 40 }.suggested_action(),
            SuggestedAction::ReduceModel
        );
    }

    #[test]
    fn test_structured_error_from_error() {
        let err = Error::StateLimitExceeded { states: 80, limit: 40 };
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 33);
        assert_eq!(structured.category, ErrorCategory::Analysis);
        assert!(structured.recoverable);
        assert_eq!(structured.context.get("states"), Some(&serde_json::json!(80)));
        assert_eq!(structured.context.get("limit"), Some(&serde_json::json!(40)));
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::UnknownModel { name: "raid".into() };
        let json = StructuredError::from(&err).with_context("hint", "nk").to_json();

        assert!(json.contains(r#""code":22"#));
        assert!(json.contains(r#""category":"model""#));
        assert!(json.contains(r#""suggested_action":"fix_model""#));
        assert!(json.contains(r#""hint":"nk""#));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::UnknownModel { name: "raid".into() };
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Unknown Model"));
        assert!(formatted.contains("unknown model 'raid'"));
        assert!(formatted.contains("nk, nk-latent, lrc2"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_display_impls() {
        assert_eq!(ErrorCategory::Analysis.to_string(), "analysis");
        assert_eq!(SuggestedAction::BindVariables.to_string(), "bind_variables");
    }
}
