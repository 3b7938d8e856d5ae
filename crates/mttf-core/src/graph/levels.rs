//! Fault levels: the shortest fault-only distance from the root.

use super::state::{NodeKey, StateId};
use super::transition::render_id;
use super::{GraphError, StateGraph};
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Fault level of every internal state plus the folded terminal class.
pub type LevelMap<Id> = BTreeMap<NodeKey<Id>, usize>;

impl<Id: StateId, T> StateGraph<Id, T> {
    /// Breadth-first search from the root along fault transitions only.
    ///
    /// All terminal ids share the [`NodeKey::Terminal`] entry, whose level is
    /// the depth at which the first terminal is reached. Every internal state
    /// must be reached, and so must the terminal class.
    pub fn fault_level_map(&self) -> Result<LevelMap<Id>, GraphError> {
        let root = self.root().ok_or(GraphError::MissingRoot)?;

        let mut levels: LevelMap<Id> = BTreeMap::new();
        let mut queue = VecDeque::new();
        levels.insert(NodeKey::Internal(root.id.clone()), 0);
        queue.push_back((root, 0usize));

        while let Some((state, level)) = queue.pop_front() {
            for tr in &state.faults {
                let key = self.key_of(&tr.target);
                if levels.contains_key(&key) {
                    continue;
                }
                let target = self.resolve(state, &tr.target)?;
                levels.insert(key, level + 1);
                if let Some(next) = target {
                    queue.push_back((next, level + 1));
                }
            }
        }

        let unreached: Vec<String> = self
            .nodes
            .keys()
            .filter(|id| !levels.contains_key(&NodeKey::Internal((*id).clone())))
            .map(render_id)
            .collect();
        if !unreached.is_empty() {
            return Err(GraphError::Unreachable { states: unreached });
        }
        if !levels.contains_key(&NodeKey::Terminal) {
            return Err(GraphError::TerminalUnreachable);
        }
        debug_assert_eq!(levels.len(), self.nodes.len() + 1);

        debug!(
            states = self.nodes.len(),
            terminal_level = levels[&NodeKey::Terminal],
            "computed fault levels"
        );
        Ok(levels)
    }

    /// Number of faults tolerated before absorption becomes possible.
    pub fn fault_resilience(&self) -> Result<usize, GraphError> {
        let levels = self.fault_level_map()?;
        Ok(levels[&NodeKey::Terminal] - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::mirrored_disk;
    use crate::graph::{fault, recover};

    #[test]
    fn mirrored_disk_levels() {
        let g = mirrored_disk();
        let levels = g.fault_level_map().unwrap();
        let expected: LevelMap<u32> = [
            (NodeKey::Internal(0), 0),
            (NodeKey::Internal(1), 1),
            (NodeKey::Terminal, 2),
        ]
        .into_iter()
        .collect();
        assert_eq!(levels, expected);
        assert_eq!(g.fault_resilience().unwrap(), 1);
    }

    #[test]
    fn terminal_level_is_the_shortest_path() {
        // 0 -> 1 -> 2 -> !9 and a shortcut 0 -> !8
        let mut g: StateGraph<u32, f64> = StateGraph::new();
        g.add_state(0, vec![fault(1, 1.0), fault(8, 0.1)], vec![], true)
            .unwrap();
        g.add_state(1, vec![fault(2, 1.0)], vec![recover(0, 1.0)], false)
            .unwrap();
        g.add_state(2, vec![fault(9, 1.0)], vec![recover(1, 1.0)], false)
            .unwrap();
        g.add_term_state(8).unwrap();
        g.add_term_state(9).unwrap();

        let levels = g.fault_level_map().unwrap();
        assert_eq!(levels[&NodeKey::Terminal], 1);
        assert_eq!(levels[&NodeKey::Internal(2)], 2);
        assert_eq!(g.fault_resilience().unwrap(), 0);
    }

    #[test]
    fn recovery_edges_do_not_reach_states() {
        // State 2 is only entered by recovery, which the search ignores.
        let mut g: StateGraph<u32, f64> = StateGraph::new();
        g.add_state(0, vec![fault(1, 1.0)], vec![], true).unwrap();
        g.add_state(1, vec![fault(3, 1.0)], vec![recover(2, 1.0)], false)
            .unwrap();
        g.add_state(2, vec![fault(3, 1.0)], vec![recover(0, 1.0)], false)
            .unwrap();
        g.add_term_state(3).unwrap();

        assert_eq!(
            g.fault_level_map().unwrap_err(),
            GraphError::Unreachable {
                states: vec!["2".into()]
            }
        );
    }

    #[test]
    fn graph_without_reachable_terminal_fails() {
        let mut g: StateGraph<u32, f64> = StateGraph::new();
        g.add_state(0, vec![fault(1, 1.0)], vec![], true).unwrap();
        g.add_state(1, vec![], vec![recover(0, 1.0)], false).unwrap();
        assert_eq!(
            g.fault_resilience().unwrap_err(),
            GraphError::TerminalUnreachable
        );
    }

    #[test]
    fn unknown_fault_target_fails() {
        let mut g: StateGraph<u32, f64> = StateGraph::new();
        g.add_state(0, vec![fault(4, 1.0)], vec![], true).unwrap();
        assert_eq!(
            g.fault_level_map().unwrap_err(),
            GraphError::UnknownTarget {
                state: "0".into(),
                target: "4".into()
            }
        );
    }
}
