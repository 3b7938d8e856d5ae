//! Local reconstruction code with two local groups.
//!
//! Each group holds `M` data blocks and one local parity; `R` global parities
//! protect both groups. A state counts failed blocks of each kind.

use crate::graph::{fault, recover, GraphError, StateGraph, Transition};
use mttf_math::Scalar;

/// Failed blocks: data in group 1 and 2, local parity of group 1 and 2 (0 or
/// 1), and global parities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LrcState {
    pub data1: u32,
    pub data2: u32,
    pub local1: u32,
    pub local2: u32,
    pub global: u32,
}

impl LrcState {
    pub const HEALTHY: LrcState = LrcState {
        data1: 0,
        data2: 0,
        local1: 0,
        local2: 0,
        global: 0,
    };

    /// Parities that can still take part in decoding the failed data blocks.
    /// A local parity only helps its own group, and only if it survives.
    fn usable_parities(&self, redundancy: u32) -> u32 {
        let mut parities = redundancy - self.global;
        if self.data1 > 0 && self.local1 == 0 {
            parities += 1;
        }
        if self.data2 > 0 && self.local2 == 0 {
            parities += 1;
        }
        parities
    }

    fn is_data_loss(&self, redundancy: u32) -> bool {
        self.data1 + self.data2 > self.usable_parities(redundancy)
    }
}

/// Rates of the LRC model.
#[derive(Debug, Clone)]
pub struct LrcRates<T> {
    /// Block failure rate.
    pub e: T,
    /// Repair rate of a group from its local parity.
    pub rl: T,
    /// Repair rate through the global parities, back to the healthy state.
    pub rg: T,
}

/// Builds the LRC graph for `m` data blocks per group and `R` global parities.
///
/// The id space is enumerated far enough that every fault out of a
/// recoverable state lands either on another enumerated state or on a
/// terminal one. A group with exactly one failed block repairs locally; when
/// no local repair applies, a damaged state repairs globally.
pub fn lrc2_fail_graph<T: Scalar>(
    m: &T,
    redundancy: u32,
    rates: &LrcRates<T>,
) -> Result<StateGraph<LrcState, T>, GraphError> {
    let mut g = StateGraph::new();
    let data_bound = redundancy + 2;
    for data1 in 0..=data_bound {
        for data2 in 0..=data_bound {
            for local1 in 0..=1 {
                for local2 in 0..=1 {
                    for global in 0..=redundancy {
                        let id = LrcState {
                            data1,
                            data2,
                            local1,
                            local2,
                            global,
                        };
                        if id.is_data_loss(redundancy) {
                            g.add_term_state(id)?;
                            continue;
                        }
                        let (faults, recovers) = lrc_transitions(id, m, redundancy, rates);
                        g.add_state(id, faults, recovers, id == LrcState::HEALTHY)?;
                    }
                }
            }
        }
    }
    Ok(g)
}

type Edges<T> = Vec<Transition<LrcState, T>>;

fn lrc_transitions<T: Scalar>(
    id: LrcState,
    m: &T,
    redundancy: u32,
    rates: &LrcRates<T>,
) -> (Edges<T>, Edges<T>) {
    let count = |k: u32| T::from_i64(i64::from(k));
    let mut faults = vec![
        fault(
            LrcState { data1: id.data1 + 1, ..id },
            (m.clone() - count(id.data1)) * rates.e.clone(),
        ),
        fault(
            LrcState { data2: id.data2 + 1, ..id },
            (m.clone() - count(id.data2)) * rates.e.clone(),
        ),
    ];
    if id.local1 == 0 {
        faults.push(fault(LrcState { local1: 1, ..id }, rates.e.clone()));
    }
    if id.local2 == 0 {
        faults.push(fault(LrcState { local2: 1, ..id }, rates.e.clone()));
    }
    if id.global < redundancy {
        faults.push(fault(
            LrcState { global: id.global + 1, ..id },
            count(redundancy - id.global) * rates.e.clone(),
        ));
    }

    let mut recovers = Vec::new();
    if id.data1 + id.local1 == 1 {
        recovers.push(recover(
            LrcState { data1: 0, local1: 0, ..id },
            rates.rl.clone(),
        ));
    }
    if id.data2 + id.local2 == 1 {
        recovers.push(recover(
            LrcState { data2: 0, local2: 0, ..id },
            rates.rl.clone(),
        ));
    }
    if recovers.is_empty() && id.data1 + id.data2 + id.global > 0 {
        recovers.push(recover(LrcState::HEALTHY, rates.rg.clone()));
    }
    (faults, recovers)
}
