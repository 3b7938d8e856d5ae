//! MTTF common types and errors.
//!
//! This crate provides foundational types shared across the mttf crates:
//! - The application error type with stable codes
//! - Output format selection for CLI payloads
//! - Schema versioning for machine-readable output

pub mod error;
pub mod output;
pub mod schema;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use output::OutputFormat;
pub use schema::{Envelope, SCHEMA_VERSION};
