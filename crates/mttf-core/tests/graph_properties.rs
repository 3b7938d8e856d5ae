//! Property-based tests for graph invariants.

use mttf_core::graph::{fault, recover, EdgeClass, NodeKey, StateGraph, Transition};
use mttf_core::models::{nk_fail_graph, nk_le_fail_graph, LatentRates};
use proptest::prelude::*;

/// A birth-death chain `0..len` failing into terminal `len`; states listed in
/// `shortcuts` can also fail straight into the terminal.
fn chain(fail: &[f64], repair: &[f64], shortcuts: &[usize]) -> StateGraph<usize, f64> {
    let len = fail.len();
    let mut g = StateGraph::new();
    for i in 0..len {
        let mut faults = vec![fault(i + 1, fail[i])];
        if shortcuts.contains(&i) && i + 1 < len {
            faults.push(fault(len, fail[i] / 2.0));
        }
        let recovers: Vec<Transition<usize, f64>> = if i == 0 {
            vec![]
        } else {
            vec![recover(i - 1, repair[i - 1])]
        };
        g.add_state(i, faults, recovers, i == 0).unwrap();
    }
    g.add_term_state(len).unwrap();
    g
}

fn chain_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, Vec<usize>)> {
    (1usize..7).prop_flat_map(|len| {
        (
            prop::collection::vec(0.01f64..2.0, len),
            prop::collection::vec(0.01f64..2.0, len),
            prop::collection::vec(0..len, 0..3),
        )
    })
}

proptest! {
    #[test]
    fn level_map_covers_every_state_and_the_terminal((fail, repair, shortcuts) in chain_strategy()) {
        let g = chain(&fail, &repair, &shortcuts);
        let levels = g.fault_level_map().unwrap();
        prop_assert_eq!(levels.len(), g.len() + 1);
        prop_assert_eq!(levels[&NodeKey::Internal(0)], 0);
        let shortest = shortcuts
            .iter()
            .filter(|&&i| i + 1 < fail.len())
            .map(|&i| i + 1)
            .chain([fail.len()])
            .min()
            .unwrap();
        prop_assert_eq!(g.fault_resilience().unwrap(), shortest - 1);
    }

    #[test]
    fn level_map_is_deterministic((fail, repair, shortcuts) in chain_strategy()) {
        let g = chain(&fail, &repair, &shortcuts);
        prop_assert_eq!(g.fault_level_map().unwrap(), g.fault_level_map().unwrap());
        prop_assert_eq!(g.major_edges().unwrap(), g.major_edges().unwrap());
    }

    #[test]
    fn exact_time_is_positive_and_finite((fail, repair, shortcuts) in chain_strategy()) {
        let g = chain(&fail, &repair, &shortcuts);
        let mttff = g.mttff_exact().unwrap();
        prop_assert!(mttff.is_finite());
        prop_assert!(mttff > 0.0);
    }

    #[test]
    fn major_edges_respect_levels((fail, repair, shortcuts) in chain_strategy()) {
        let g = chain(&fail, &repair, &shortcuts);
        let levels = g.fault_level_map().unwrap();
        for state in g.get_states().unwrap() {
            for tr in &state.faults {
                let class = g.classify_fault(&levels, state, tr).unwrap();
                let from = levels[&NodeKey::Internal(state.id)];
                let to = if g.is_terminal(&tr.target) {
                    levels[&NodeKey::Terminal]
                } else {
                    levels[&NodeKey::Internal(tr.target)]
                };
                prop_assert_eq!(class == EdgeClass::Major, to == from + 1);
            }
            for tr in &state.recovers {
                prop_assert_eq!(g.classify_recovery(&levels, state, tr).unwrap(), EdgeClass::Minor);
            }
        }
    }

    #[test]
    fn replication_resilience_is_redundancy(redundancy in 0u32..6, n in 8u32..16) {
        let g = nk_fail_graph(&f64::from(n), redundancy, &1e-3, &1.0).unwrap();
        prop_assert_eq!(g.fault_resilience().unwrap(), redundancy as usize);
    }

    #[test]
    fn latent_errors_never_help(redundancy in 0u32..3, es in 1e-6f64..1e-4) {
        let n = 10.0;
        let plain = nk_fail_graph(&n, redundancy, &1e-4, &1.0).unwrap();
        let rates = LatentRates { e: 1e-4, r: 1.0, es, rs: 1.0 };
        let latent = nk_le_fail_graph(&n, redundancy, &rates).unwrap();
        prop_assert_eq!(latent.fault_resilience().unwrap(), redundancy as usize);
        prop_assert!(latent.mttff_exact().unwrap() < plain.mttff_exact().unwrap());
    }
}
