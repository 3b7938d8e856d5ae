//! Serializable overview of a graph for reports.

use super::state::{NodeKey, StateId};
use super::transition::render_id;
use super::{GraphError, StateGraph};
use serde::{Deserialize, Serialize};

/// Fault level of one state; `state` is `None` for the terminal class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub state: Option<String>,
    pub level: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub states: usize,
    pub terminals: usize,
    pub fault_transitions: usize,
    pub recovery_transitions: usize,
    pub resilience: usize,
    pub levels: Vec<LevelEntry>,
}

impl<Id: StateId, T> StateGraph<Id, T> {
    pub fn summary(&self) -> Result<GraphSummary, GraphError> {
        let levels = self.fault_level_map()?;
        let terminal_level = levels[&NodeKey::Terminal];
        let (fault_transitions, recovery_transitions) = self
            .nodes
            .values()
            .fold((0, 0), |(f, r), s| (f + s.faults.len(), r + s.recovers.len()));

        Ok(GraphSummary {
            states: self.nodes.len(),
            terminals: self.terminals.len(),
            fault_transitions,
            recovery_transitions,
            resilience: terminal_level - 1,
            levels: levels
                .iter()
                .map(|(key, level)| LevelEntry {
                    state: key.internal().map(render_id),
                    level: *level,
                })
                .collect(),
        })
    }
}
