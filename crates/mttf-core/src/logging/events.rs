//! Stable event vocabulary for structured logs.
//!
//! Every analysis run opens spans carrying `run_id`, `model` and `stage`;
//! the JSONL layer lifts those onto each event emitted inside them.

use serde::{Deserialize, Serialize};
use tracing::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Configuration loading and model construction.
    Build,
    /// Structural checks on the graph.
    Validate,
    /// Fault-level search.
    Levels,
    /// Exact solve through the generator matrix.
    Exact,
    /// Major-edge flow propagation.
    Asymptotic,
    /// Payload rendering.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Build => "build",
            Stage::Validate => "validate",
            Stage::Levels => "levels",
            Stage::Exact => "exact",
            Stage::Asymptotic => "asymptotic",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const GRAPH_BUILT: &str = "graph.built";
    pub const GRAPH_VALIDATED: &str = "graph.validated";

    pub const ANALYSIS_STARTED: &str = "analysis.started";
    pub const ANALYSIS_EXACT_SKIPPED: &str = "analysis.exact_skipped";
    pub const ANALYSIS_FINISHED: &str = "analysis.finished";
    pub const ANALYSIS_FAILED: &str = "analysis.failed";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation data shared by all events of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub model: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Span for one stage; events recorded inside inherit its fields.
    pub fn span(&self, stage: Stage) -> Span {
        tracing::info_span!(
            "stage",
            run_id = %self.run_id,
            model = self.model.as_deref().unwrap_or(""),
            stage = %stage,
        )
    }
}
