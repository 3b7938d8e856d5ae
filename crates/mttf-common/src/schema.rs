//! Schema versioning for machine-readable payloads.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Version of the JSON payload layout emitted by the CLI.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Common header wrapped around every JSON payload.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub schema_version: &'static str,
    pub run_id: String,
    pub generated_at: String,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(run_id: impl Into<String>, payload: T) -> Self {
        Envelope {
            schema_version: SCHEMA_VERSION,
            run_id: run_id.into(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            payload,
        }
    }
}
