//! N-K replication: any `R` of `N` components may fail.

use crate::graph::{fault, recover, GraphError, StateGraph};
use mttf_math::Scalar;

/// Chain `0..=R` of failure counts with data loss at `R + 1`.
///
/// With `i` components down, the next one fails at `(N - i) * e` and the
/// most recent one is repaired at `r`.
pub fn nk_fail_graph<T: Scalar>(
    n: &T,
    redundancy: u32,
    e: &T,
    r: &T,
) -> Result<StateGraph<u32, T>, GraphError> {
    let mut g = StateGraph::new();
    g.add_state(0, vec![fault(1, n.clone() * e.clone())], vec![], true)?;
    for i in 1..=redundancy {
        let rate = (n.clone() - T::from_i64(i64::from(i))) * e.clone();
        g.add_state(i, vec![fault(i + 1, rate)], vec![recover(i - 1, r.clone())], false)?;
    }
    g.add_term_state(redundancy + 1)?;
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKey;
    use mttf_math::Expr;

    fn symbols() -> (Expr, Expr, Expr) {
        (Expr::symbol("N"), Expr::symbol("e"), Expr::symbol("r"))
    }

    #[test]
    fn resilience_equals_redundancy() {
        let (n, e, r) = symbols();
        for redundancy in 0..5 {
            let g = nk_fail_graph(&n, redundancy, &e, &r).unwrap();
            assert_eq!(g.fault_resilience().unwrap(), redundancy as usize);
            assert_eq!(g.len(), redundancy as usize + 1);
        }
    }

    #[test]
    fn two_of_n_chain() {
        let (n, e, r) = symbols();
        let g = nk_fail_graph(&n, 2, &e, &r).unwrap();
        assert_eq!(
            g.to_string(),
            "#0 fault[N*e]->#1\n\
             #1 fault[e*(N - 1)]->#2 recover[r]->#0\n\
             #2 fault[e*(N - 2)]->!3 recover[r]->#1"
        );
        let levels = g.fault_level_map().unwrap();
        assert_eq!(levels[&NodeKey::Terminal], 3);
    }

    #[test]
    fn asymptotic_is_leading_term() {
        let (n, e, r) = symbols();
        let g = nk_fail_graph(&n, 1, &e, &r).unwrap();
        // N e (N - 1) e / r flows into data loss.
        let expected = r.clone() / (n.clone() * (n - Expr::integer(1)) * e.clone() * e);
        assert_eq!(g.mttff_asymptotic().unwrap(), expected);
    }

    #[test]
    fn exact_approaches_asymptotic_numerically() {
        let g = nk_fail_graph(&8.0, 2, &1e-5, &1.0).unwrap();
        let exact = g.mttff_exact().unwrap();
        let asymptotic = g.mttff_asymptotic().unwrap();
        assert!((asymptotic / exact - 1.0).abs() < 1e-3);
    }
}
