//! Fuzz target for the state-graph analyses.
//!
//! Arbitrary graphs, including malformed ones, must be rejected with a
//! `GraphError` rather than a panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mttf_core::graph::{fault, recover, StateGraph};

#[derive(Debug, Arbitrary)]
struct FuzzState {
    id: u8,
    faults: Vec<(u8, u8)>,
    recovers: Vec<(u8, u8)>,
    is_root: bool,
}

#[derive(Debug, Arbitrary)]
struct FuzzGraph {
    states: Vec<FuzzState>,
    terminals: Vec<u8>,
}

fn rate(raw: u8) -> f64 {
    f64::from(raw) / 16.0
}

fuzz_target!(|input: FuzzGraph| {
    let mut g: StateGraph<u8, f64> = StateGraph::new();
    for t in input.terminals {
        let _ = g.add_term_state(t);
    }
    for s in input.states {
        let faults = s.faults.iter().map(|&(t, r)| fault(t, rate(r))).collect();
        let recovers = s.recovers.iter().map(|&(t, r)| recover(t, rate(r))).collect();
        let _ = g.add_state(s.id, faults, recovers, s.is_root);
    }

    let _ = g.validate();
    let _ = g.summary();
    let _ = g.major_edges();
    let _ = g.mttff_asymptotic();
    if g.len() <= 16 {
        let _ = g.mttff_exact();
    }
});
