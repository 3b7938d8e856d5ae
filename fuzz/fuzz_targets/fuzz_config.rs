//! Fuzz target for analysis configuration parsing.
//!
//! Parsing and validating arbitrary TOML or JSON must return an error, never
//! panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mttf_config::{validate_config, AnalysisConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for parsed in [AnalysisConfig::from_toml(text), AnalysisConfig::from_json(text)] {
        if let Ok(config) = parsed {
            let _ = validate_config(&config);
            let _ = config.regime_bindings();
        }
    }
});
