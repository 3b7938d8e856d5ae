//! Markov fault/recovery state graphs.
//!
//! A [`StateGraph`] is built once by a model builder through
//! [`StateGraph::add_state`] and [`StateGraph::add_term_state`], then only
//! read. Every analysis is a method on the graph:
//!
//! - [`StateGraph::transition_intensity_matrix`] and
//!   [`StateGraph::mttff_exact`] solve the chain exactly
//! - [`StateGraph::fault_level_map`] and [`StateGraph::fault_resilience`]
//!   classify states by the number of faults needed to reach them
//! - [`StateGraph::visit_major_edges`] walks the acyclic major-edge reduction
//!   in topological order
//! - [`StateGraph::mttff_asymptotic`] propagates flow along that reduction
//!
//! Rates are any [`Scalar`](mttf_math::Scalar): symbolic [`Expr`](mttf_math::Expr)
//! for closed forms, or `f64`/`BigRational` for numbers.

mod asymptotic;
mod error;
mod generator;
mod levels;
mod major;
mod state;
mod summary;
mod transition;

pub use asymptotic::FlowAccumulator;
pub use error::GraphError;
pub use levels::LevelMap;
pub use major::{EdgeClass, MajorEdge, MajorEdgeVisitor};
pub use state::{NodeKey, State, StateId};
pub use summary::{GraphSummary, LevelEntry};
pub use transition::{fault, recover, Transition, FAULT_LABEL, RECOVER_LABEL};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use transition::render_id;

/// A continuous-time Markov chain over damage states.
///
/// Internal states live in `nodes`; absorbing failure states are only ids in
/// `terminals`. The two id spaces are disjoint.
#[derive(Debug, Clone)]
pub struct StateGraph<Id, T> {
    root: Option<Id>,
    nodes: BTreeMap<Id, State<Id, T>>,
    terminals: BTreeSet<Id>,
}

impl<Id: StateId, T> Default for StateGraph<Id, T> {
    fn default() -> Self {
        StateGraph {
            root: None,
            nodes: BTreeMap::new(),
            terminals: BTreeSet::new(),
        }
    }
}

impl<Id: StateId, T> StateGraph<Id, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an internal state.
    ///
    /// The root may be set once and must not have recovery transitions.
    pub fn add_state(
        &mut self,
        id: Id,
        faults: Vec<Transition<Id, T>>,
        recovers: Vec<Transition<Id, T>>,
        is_root: bool,
    ) -> Result<&State<Id, T>, GraphError> {
        if is_root {
            if let Some(existing) = &self.root {
                return Err(GraphError::DuplicateRoot {
                    existing: render_id(existing),
                    id: render_id(&id),
                });
            }
            if !recovers.is_empty() {
                return Err(GraphError::RootHasRecovery { id: render_id(&id) });
            }
        }
        if self.terminals.contains(&id) {
            return Err(GraphError::TerminalCollision { id: render_id(&id) });
        }
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateState { id: render_id(&id) });
        }

        if is_root {
            self.root = Some(id.clone());
        }
        let state = self
            .nodes
            .entry(id.clone())
            .or_insert_with(|| State::new(id, faults, recovers));
        Ok(state)
    }

    /// Register an absorbing state id. Adding the same id twice is a no-op.
    pub fn add_term_state(&mut self, id: Id) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::TerminalCollision { id: render_id(&id) });
        }
        self.terminals.insert(id);
        Ok(())
    }

    pub fn root(&self) -> Option<&State<Id, T>> {
        self.root.as_ref().and_then(|id| self.nodes.get(id))
    }

    /// Number of internal states.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn terminals(&self) -> &BTreeSet<Id> {
        &self.terminals
    }

    pub fn is_terminal(&self, id: &Id) -> bool {
        self.terminals.contains(id)
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(State::out_degree).sum()
    }

    /// Internal states, root first, then the rest by ascending id.
    ///
    /// This order fixes the rows and columns of the generator matrix.
    pub fn get_states(&self) -> Result<Vec<&State<Id, T>>, GraphError> {
        let root = self.root().ok_or(GraphError::MissingRoot)?;
        Ok(std::iter::once(root).chain(self.non_root_states()).collect())
    }

    fn non_root_states(&self) -> impl Iterator<Item = &State<Id, T>> {
        self.nodes
            .values()
            .filter(move |s| Some(&s.id) != self.root.as_ref())
    }

    /// Position of every internal state in [`get_states`](Self::get_states).
    pub fn state_index(&self) -> Result<BTreeMap<Id, usize>, GraphError> {
        Ok(self
            .get_states()?
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect())
    }

    /// Resolve a transition target: `Some` for an internal state, `None` for
    /// a terminal id.
    pub fn find_node(&self, id: &Id) -> Result<Option<&State<Id, T>>, GraphError> {
        if self.terminals.contains(id) {
            return Ok(None);
        }
        self.nodes
            .get(id)
            .map(Some)
            .ok_or_else(|| GraphError::UnknownState { id: render_id(id) })
    }

    /// Like [`find_node`](Self::find_node) with the source named in the error.
    pub(crate) fn resolve(
        &self,
        source: &State<Id, T>,
        target: &Id,
    ) -> Result<Option<&State<Id, T>>, GraphError> {
        self.find_node(target).map_err(|_| GraphError::UnknownTarget {
            state: render_id(&source.id),
            target: render_id(target),
        })
    }

    /// Level-map key of a transition target.
    pub(crate) fn key_of(&self, id: &Id) -> NodeKey<Id> {
        if self.terminals.contains(id) {
            NodeKey::Terminal
        } else {
            NodeKey::Internal(id.clone())
        }
    }

    /// Check the structural invariants without running any analysis.
    pub fn validate(&self) -> Result<(), GraphError> {
        let root = self.root().ok_or(GraphError::MissingRoot)?;
        if !root.recovers.is_empty() {
            return Err(GraphError::RootHasRecovery {
                id: render_id(&root.id),
            });
        }
        for state in self.nodes.values() {
            for tr in &state.faults {
                self.resolve(state, &tr.target)?;
            }
            for tr in &state.recovers {
                if self.resolve(state, &tr.target)?.is_none() {
                    return Err(GraphError::RecoveryIntoTerminal {
                        state: render_id(&state.id),
                        target: render_id(&tr.target),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<Id: StateId, T: fmt::Display> StateGraph<Id, T> {
    fn fmt_transition(&self, tr: &Transition<Id, T>) -> String {
        let marker = if self.terminals.contains(&tr.target) {
            '!'
        } else {
            '#'
        };
        format!("{}[{}]->{}{}", tr.label, tr.rate, marker, render_id(&tr.target))
    }

    /// One rendered line per state.
    pub fn render_lines(&self) -> Vec<String> {
        self.root()
            .into_iter()
            .chain(self.non_root_states())
            .map(|state| {
                let mut line = format!("#{}", render_id(&state.id));
                for tr in state.transitions() {
                    line.push(' ');
                    line.push_str(&self.fmt_transition(tr));
                }
                line
            })
            .collect()
    }
}

/// Lists states root first as `#id label[rate]->#target`, with `!` marking
/// terminal targets.
impl<Id: StateId, T: fmt::Display> fmt::Display for StateGraph<Id, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_lines().join("\n"))
    }
}
