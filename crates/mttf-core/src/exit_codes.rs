//! Exit codes for the mttf CLI.
//!
//! Codes are a stable contract for automation:
//! - 0: success
//! - 10-19: user errors (bad arguments, configuration or model)
//! - 20-29: internal and I/O errors

use mttf_common::{Error, ErrorCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Analysis completed.
    Clean = 0,

    /// Invalid arguments.
    ArgsError = 10,

    /// Configuration file missing, unreadable or invalid.
    ConfigError = 11,

    /// Unknown model or malformed state graph.
    ModelError = 12,

    /// Solver failure or unevaluable result.
    AnalysisError = 13,

    /// Internal error (bug, please report).
    InternalError = 20,

    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Codes 10-19, resolvable by the user.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&self.as_i32())
    }

    pub fn is_internal_error(self) -> bool {
        self.as_i32() >= 20
    }

    pub fn is_error(self) -> bool {
        self.as_i32() >= 10
    }

    /// Name used in JSON error payloads.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::ModelError => "ERR_MODEL",
            ExitCode::AnalysisError => "ERR_ANALYSIS",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Model => ExitCode::ModelError,
            ErrorCategory::Analysis => ExitCode::AnalysisError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
