//! Generator matrix and the exact mean time to first failure.

use super::state::StateId;
use super::transition::render_id;
use super::{GraphError, StateGraph};
use mttf_math::{Matrix, Scalar};
use tracing::{debug, trace};

impl<Id: StateId, T: Scalar> StateGraph<Id, T> {
    /// Generator of the chain restricted to internal states.
    ///
    /// Rows and columns follow [`get_states`](Self::get_states). Transitions
    /// into terminal ids count towards the diagonal but have no column.
    /// Parallel transitions to the same target add up.
    pub fn transition_intensity_matrix(&self) -> Result<Matrix<T>, GraphError> {
        let states = self.get_states()?;
        let index = self.state_index()?;
        let n = states.len();
        let mut m = Matrix::zeros(n, n);

        for (i, state) in states.iter().enumerate() {
            let mut total = T::zero();
            for tr in &state.faults {
                total = total + tr.rate.clone();
                if self.resolve(state, &tr.target)?.is_some() {
                    add_entry(&mut m, i, index[&tr.target], &tr.rate)?;
                }
            }
            for tr in &state.recovers {
                total = total + tr.rate.clone();
                if self.resolve(state, &tr.target)?.is_none() {
                    return Err(GraphError::RecoveryIntoTerminal {
                        state: render_id(&state.id),
                        target: render_id(&tr.target),
                    });
                }
                add_entry(&mut m, i, index[&tr.target], &tr.rate)?;
            }
            m.set(i, i, -total)?;
        }

        debug!(states = n, "built transition intensity matrix");
        Ok(m)
    }

    /// Expected time from the root to absorption, solved exactly.
    ///
    /// With generator `M`, the hitting times satisfy `M·h = -1`. By Cramer's
    /// rule `h[0] = -det(M') / det(M)` where `M'` is `M` with its first
    /// column replaced by ones.
    ///
    /// Singularity is detected exactly: a zero determinant, or for `f64` a
    /// result that is not finite.
    pub fn mttff_exact(&self) -> Result<T, GraphError> {
        let mut m = self.transition_intensity_matrix()?;
        let d = m.determinant()?;
        if d.is_zero() {
            return Err(GraphError::SingularGenerator);
        }
        trace!(det = %d, "generator determinant");

        m.set_column(0, &T::one())?;
        let d1 = m.determinant()?;
        let mttff = (-d1)
            .checked_div(&d)
            .ok_or(GraphError::SingularGenerator)?
            .simplify();
        if !mttff.is_finite() {
            return Err(GraphError::SingularGenerator);
        }
        debug!(states = m.rows(), "solved exact mttff");
        Ok(mttff)
    }
}

fn add_entry<T: Scalar>(
    m: &mut Matrix<T>,
    row: usize,
    col: usize,
    rate: &T,
) -> Result<(), GraphError> {
    let current = m.get(row, col).cloned().unwrap_or_else(T::zero);
    m.set(row, col, current + rate.clone())?;
    Ok(())
}
