//! Asymptotic MTTFF for fault rates much smaller than recovery rates.

use super::major::MajorEdgeVisitor;
use super::state::{State, StateId};
use super::transition::{render_id, Transition};
use super::{GraphError, StateGraph};
use mttf_math::Scalar;
use std::collections::BTreeMap;
use tracing::debug;

/// Running totals of the flow propagation.
///
/// `population` is the unnormalized probability mass of each internal state
/// (the root holds 1), and `term_rate` the total flux into terminal states.
/// Entered states are assumed to drain back through their recoveries at once,
/// so a state receives `inflow / total recovery rate`.
#[derive(Debug, Clone)]
pub struct FlowAccumulator<Id, T> {
    population: BTreeMap<Id, T>,
    term_rate: T,
}

impl<Id: StateId, T: Scalar> FlowAccumulator<Id, T> {
    pub fn new(root: Id) -> Self {
        FlowAccumulator {
            population: BTreeMap::from([(root, T::one())]),
            term_rate: T::zero(),
        }
    }

    pub fn population(&self, id: &Id) -> T {
        self.population.get(id).cloned().unwrap_or_else(T::zero)
    }

    pub fn term_rate(&self) -> &T {
        &self.term_rate
    }

    /// `1 / term_rate`.
    pub fn mttff(&self) -> Result<T, GraphError> {
        T::one()
            .checked_div(&self.term_rate)
            .map(|t| t.simplify())
            .ok_or(GraphError::NoTerminalFlow)
    }
}

impl<Id: StateId, T: Scalar> MajorEdgeVisitor<Id, T> for FlowAccumulator<Id, T> {
    fn visit(
        &mut self,
        target: Option<&State<Id, T>>,
        source: &State<Id, T>,
        transition: &Transition<Id, T>,
    ) -> Result<(), GraphError> {
        let flux = self.population(&source.id) * transition.rate.clone();
        let Some(target) = target else {
            self.term_rate = self.term_rate.clone() + flux;
            return Ok(());
        };

        let recovery_rate = target
            .recovers
            .iter()
            .fold(T::zero(), |acc, r| acc + r.rate.clone());
        let inflow = flux
            .checked_div(&recovery_rate)
            .ok_or_else(|| GraphError::ZeroRecoveryRate {
                state: render_id(&target.id),
            })?;
        let slot = self
            .population
            .entry(target.id.clone())
            .or_insert_with(T::zero);
        *slot = slot.clone() + inflow;
        Ok(())
    }
}

impl<Id: StateId, T: Scalar> StateGraph<Id, T> {
    /// Leading-order MTTFF when recoveries are much faster than faults.
    ///
    /// Propagates population along major transitions in topological order and
    /// returns `1 / term_rate`.
    pub fn mttff_asymptotic(&self) -> Result<T, GraphError> {
        let root = self.root().ok_or(GraphError::MissingRoot)?;
        let mut flow = FlowAccumulator::new(root.id.clone());
        self.visit_major_edges(&mut flow)?;
        let mttff = flow.mttff()?;
        debug!(term_rate = %flow.term_rate(), "solved asymptotic mttff");
        Ok(mttff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::mirrored_disk;
    use crate::graph::{fault, recover};
    use mttf_math::Expr;

    #[test]
    fn mirrored_disk_asymptotic() {
        let g = mirrored_disk();
        let e = Expr::symbol("e");
        let r = Expr::symbol("r");
        let mttff = g.mttff_asymptotic().unwrap();
        assert_eq!(mttff, r / (Expr::integer(2) * e.clone() * e));
        assert_eq!(mttff.to_string(), "r/(2*e^2)");
    }

    #[test]
    fn accumulator_tracks_population() {
        let g = mirrored_disk();
        let mut flow = FlowAccumulator::new(0u32);
        g.visit_major_edges(&mut flow).unwrap();
        let e = Expr::symbol("e");
        let r = Expr::symbol("r");
        assert_eq!(flow.population(&1), Expr::integer(2) * e.clone() / r.clone());
        assert_eq!(
            flow.term_rate(),
            &(Expr::integer(2) * e.clone() * e / r)
        );
    }

    #[test]
    fn state_without_recovery_is_degenerate() {
        let mut g: StateGraph<u32, f64> = StateGraph::new();
        g.add_state(0, vec![fault(1, 1.0)], vec![], true).unwrap();
        g.add_state(1, vec![fault(2, 1.0)], vec![], false).unwrap();
        g.add_term_state(2).unwrap();
        assert_eq!(
            g.mttff_asymptotic().unwrap_err(),
            GraphError::ZeroRecoveryRate { state: "1".into() }
        );
    }

    #[test]
    fn zero_rate_into_terminal_is_no_flow() {
        let mut g: StateGraph<u32, f64> = StateGraph::new();
        g.add_state(0, vec![fault(1, 0.0)], vec![], true).unwrap();
        g.add_term_state(1).unwrap();
        assert_eq!(g.mttff_asymptotic().unwrap_err(), GraphError::NoTerminalFlow);
    }

    #[test]
    fn numeric_chain_is_close_to_exact_when_recovery_dominates() {
        let (e, r) = (1e-4, 1.0);
        let mut g: StateGraph<u32, f64> = StateGraph::new();
        g.add_state(0, vec![fault(1, 3.0 * e)], vec![], true).unwrap();
        g.add_state(1, vec![fault(2, 2.0 * e)], vec![recover(0, r)], false)
            .unwrap();
        g.add_state(2, vec![fault(3, e)], vec![recover(1, r)], false)
            .unwrap();
        g.add_term_state(3).unwrap();

        let exact = g.mttff_exact().unwrap();
        let asymptotic = g.mttff_asymptotic().unwrap();
        assert!((asymptotic / exact - 1.0).abs() < 1e-2);
    }
}
