//! MTTF analysis core library.
//!
//! - [`graph`]: continuous-time Markov fault/recovery state graphs with exact
//!   and asymptotic mean time to first failure
//! - [`models`]: built-in storage redundancy schemes
//! - [`analysis`]: end-to-end analysis and report rendering
//! - [`logging`]: structured logging for the CLI
//! - [`exit_codes`]: CLI exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod analysis;
pub mod exit_codes;
pub mod graph;
pub mod logging;
pub mod models;
