//! N-K replication with latent sector errors.

use crate::graph::{fault, recover, GraphError, StateGraph, Transition};
use mttf_math::Scalar;

/// Failure/recovery rates of the latent-error model.
#[derive(Debug, Clone)]
pub struct LatentRates<T> {
    /// Whole-component failure rate.
    pub e: T,
    /// Component rebuild rate.
    pub r: T,
    /// Sector error rate.
    pub es: T,
    /// Sector scrub/repair rate.
    pub rs: T,
}

/// States are `(d, s)`: `d` failed components and `s` components carrying a
/// latent sector error. More than `R` damaged components lose data.
///
/// A healthy component fails at `e` or develops a sector error at `es`; a
/// component with a sector error may also fail outright at `e`, turning the
/// sector error into a full failure. Failed components are rebuilt at `r`
/// and sector errors repaired at `rs`.
pub fn nk_le_fail_graph<T: Scalar>(
    n: &T,
    redundancy: u32,
    rates: &LatentRates<T>,
) -> Result<StateGraph<(u32, u32), T>, GraphError> {
    let mut g = StateGraph::new();
    for d in 0..=redundancy + 1 {
        for s in 0..=redundancy + 1 {
            if d + s > redundancy {
                g.add_term_state((d, s))?;
                continue;
            }
            let healthy = n.clone() - T::from_i64(i64::from(d + s));
            let mut faults = vec![
                fault((d + 1, s), healthy.clone() * rates.e.clone()),
                fault((d, s + 1), healthy * rates.es.clone()),
            ];
            if s > 0 {
                faults.push(fault((d + 1, s - 1), T::from_i64(i64::from(s)) * rates.e.clone()));
            }

            let mut recovers: Vec<Transition<(u32, u32), T>> = Vec::new();
            if d > 0 {
                recovers.push(recover((d - 1, s), rates.r.clone()));
            }
            if s > 0 {
                recovers.push(recover((d, s - 1), rates.rs.clone()));
            }
            g.add_state((d, s), faults, recovers, d == 0 && s == 0)?;
        }
    }
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mttf_math::Expr;

    fn symbolic() -> LatentRates<Expr> {
        LatentRates {
            e: Expr::symbol("e"),
            r: Expr::symbol("r"),
            es: Expr::symbol("es"),
            rs: Expr::symbol("rs"),
        }
    }

    #[test]
    fn resilience_equals_redundancy() {
        let n = Expr::symbol("N");
        for redundancy in 1..4 {
            let g = nk_le_fail_graph(&n, redundancy, &symbolic()).unwrap();
            assert_eq!(g.fault_resilience().unwrap(), redundancy as usize);
        }
    }

    #[test]
    fn state_space_is_the_damage_triangle() {
        let g = nk_le_fail_graph(&Expr::symbol("N"), 2, &symbolic()).unwrap();
        // (d, s) with d + s <= 2.
        assert_eq!(g.len(), 6);
        assert!(g.is_terminal(&(3, 0)));
        assert!(g.is_terminal(&(1, 2)));
        let corner = g.find_node(&(1, 1)).unwrap().unwrap();
        assert_eq!(corner.faults.len(), 3);
        assert_eq!(corner.recovers.len(), 2);
    }

    #[test]
    fn one_redundancy_asymptotic() {
        // R = 1: states (0,0), (1,0), (0,1).
        let rates = symbolic();
        let n = Expr::symbol("N");
        let g = nk_le_fail_graph(&n, 1, &rates).unwrap();
        let (e, r, es, rs) = (rates.e, rates.r, rates.es, rates.rs);
        let n1 = n.clone() - Expr::integer(1);

        let p_disk = n.clone() * e.clone() / r;
        let p_sector = n * es.clone() / rs;
        // The sector-to-disk fault from (0,1) stays on level 1 and is minor.
        let term_rate = (p_disk + p_sector) * n1 * (e + es);
        let expected = Expr::one() / term_rate;
        assert_eq!(g.mttff_asymptotic().unwrap(), expected);
    }

    #[test]
    fn numeric_exact_and_asymptotic_agree() {
        let rates = LatentRates {
            e: 1e-6,
            r: 1.0,
            es: 2e-6,
            rs: 0.5,
        };
        let g = nk_le_fail_graph(&6.0, 2, &rates).unwrap();
        let exact = g.mttff_exact().unwrap();
        let asymptotic = g.mttff_asymptotic().unwrap();
        assert!((asymptotic / exact - 1.0).abs() < 1e-3);
    }
}
