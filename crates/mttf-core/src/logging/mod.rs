//! Structured logging for the mttf CLI.
//!
//! Human-readable output for interactive use, JSONL for pipelines. Both go to
//! stderr; stdout carries only the command payload.
//!
//! ```ignore
//! use mttf_core::logging::{init_logging, LogConfig, LogContext, Stage, event_names};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! let ctx = LogContext::new(generate_run_id()).with_model("nk");
//! let _stage = ctx.span(Stage::Build).entered();
//! log_event!(INFO, event_names::GRAPH_BUILT, "model graph built", states = 3);
//! ```

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Level, LogContext, Stage};
pub use layer::JsonlLayer;

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Later calls are ignored.
///
/// `RUST_LOG` directives, when present, replace the level-derived filter.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mttf_core={level},mttf={level}",
            level = config.level
        ))
    });

    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(JsonlLayer::stderr())
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}

/// Unique ID for this invocation: `run-` and 12 hex characters.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}

/// Emit a named event at the given level.
///
/// ```ignore
/// log_event!(DEBUG, event_names::ANALYSIS_STARTED, "analysis started", states = 12);
/// ```
#[macro_export]
macro_rules! log_event {
    (INFO, $event:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::info!(event = $event, $($key = $val,)* "{}", $msg)
    };
    (DEBUG, $event:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::debug!(event = $event, $($key = $val,)* "{}", $msg)
    };
    (WARN, $event:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::warn!(event = $event, $($key = $val,)* "{}", $msg)
    };
    (ERROR, $event:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::error!(event = $event, $($key = $val,)* "{}", $msg)
    };
}
