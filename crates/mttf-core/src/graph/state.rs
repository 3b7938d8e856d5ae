//! Nodes of the state graph and the keys used by level maps.

use super::transition::Transition;
use std::fmt::Debug;
use std::hash::Hash;

/// Requirements on state identifiers.
///
/// Ids are totally ordered so that listings and matrix rows come out in the
/// same order on every run.
pub trait StateId: Ord + Hash + Clone + Debug {}

impl<Id: Ord + Hash + Clone + Debug> StateId for Id {}

/// An internal (non-absorbing) state with its outgoing transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct State<Id, T> {
    pub id: Id,
    pub faults: Vec<Transition<Id, T>>,
    pub recovers: Vec<Transition<Id, T>>,
}

impl<Id, T> State<Id, T> {
    pub fn new(id: Id, faults: Vec<Transition<Id, T>>, recovers: Vec<Transition<Id, T>>) -> Self {
        State {
            id,
            faults,
            recovers,
        }
    }

    /// Fault transitions followed by recovery transitions.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition<Id, T>> {
        self.faults.iter().chain(self.recovers.iter())
    }

    pub fn out_degree(&self) -> usize {
        self.faults.len() + self.recovers.len()
    }
}

/// Key of a level map: an internal state, or the single logical terminal
/// class that every absorbing id folds into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey<Id> {
    Internal(Id),
    Terminal,
}

impl<Id> NodeKey<Id> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeKey::Terminal)
    }

    pub fn internal(&self) -> Option<&Id> {
        match self {
            NodeKey::Internal(id) => Some(id),
            NodeKey::Terminal => None,
        }
    }
}
