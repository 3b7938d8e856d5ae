//! Major/minor edge classification and the topological major-edge walk.
//!
//! Dropping minor edges (faults that do not raise the fault level, recoveries
//! that lower it) leaves an acyclic graph layered by level. When fault rates
//! are much smaller than recovery rates the flow through minor edges is
//! negligible, so the asymptotic estimate only needs the major ones.

use super::levels::LevelMap;
use super::state::{NodeKey, State, StateId};
use super::transition::{render_id, Transition};
use super::{GraphError, StateGraph};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClass {
    Major,
    Minor,
}

/// Callback for [`StateGraph::visit_major_edges`].
///
/// `target` is `None` when the transition enters a terminal id.
pub trait MajorEdgeVisitor<Id, T> {
    fn visit(
        &mut self,
        target: Option<&State<Id, T>>,
        source: &State<Id, T>,
        transition: &Transition<Id, T>,
    ) -> Result<(), GraphError>;
}

impl<Id, T, F> MajorEdgeVisitor<Id, T> for F
where
    F: FnMut(Option<&State<Id, T>>, &State<Id, T>, &Transition<Id, T>) -> Result<(), GraphError>,
{
    fn visit(
        &mut self,
        target: Option<&State<Id, T>>,
        source: &State<Id, T>,
        transition: &Transition<Id, T>,
    ) -> Result<(), GraphError> {
        self(target, source, transition)
    }
}

/// A major transition in visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct MajorEdge<Id, T> {
    pub source: Id,
    pub transition: Transition<Id, T>,
    pub into_terminal: bool,
}

impl<Id: StateId, T> StateGraph<Id, T> {
    fn level_of(&self, levels: &LevelMap<Id>, key: &NodeKey<Id>) -> Result<usize, GraphError> {
        levels.get(key).copied().ok_or_else(|| match key {
            NodeKey::Internal(id) => GraphError::UnknownState { id: render_id(id) },
            NodeKey::Terminal => GraphError::TerminalUnreachable,
        })
    }

    /// A fault is minor when it does not raise the level, and must otherwise
    /// raise it by exactly one.
    pub fn classify_fault(
        &self,
        levels: &LevelMap<Id>,
        source: &State<Id, T>,
        transition: &Transition<Id, T>,
    ) -> Result<EdgeClass, GraphError> {
        let level = self.level_of(levels, &NodeKey::Internal(source.id.clone()))?;
        let target_level = self.level_of(levels, &self.key_of(&transition.target))?;
        if target_level <= level {
            return Ok(EdgeClass::Minor);
        }
        if target_level != level + 1 {
            return Err(GraphError::LevelSkip {
                state: render_id(&source.id),
                target: render_id(&transition.target),
                level,
                target_level,
            });
        }
        Ok(EdgeClass::Major)
    }

    /// A recovery is minor when it strictly lowers the level. Recoveries
    /// within a level stay major; recoveries may never raise the level.
    pub fn classify_recovery(
        &self,
        levels: &LevelMap<Id>,
        source: &State<Id, T>,
        transition: &Transition<Id, T>,
    ) -> Result<EdgeClass, GraphError> {
        if self.is_terminal(&transition.target) {
            return Err(GraphError::RecoveryIntoTerminal {
                state: render_id(&source.id),
                target: render_id(&transition.target),
            });
        }
        let level = self.level_of(levels, &NodeKey::Internal(source.id.clone()))?;
        let target_level =
            self.level_of(levels, &NodeKey::Internal(transition.target.clone()))?;
        if target_level > level {
            return Err(GraphError::RecoveryRaisesLevel {
                state: render_id(&source.id),
                target: render_id(&transition.target),
                level,
                target_level,
            });
        }
        Ok(if target_level < level {
            EdgeClass::Minor
        } else {
            EdgeClass::Major
        })
    }

    /// Major outgoing transitions of `state`, faults first.
    fn major_transitions<'g>(
        &'g self,
        levels: &LevelMap<Id>,
        state: &'g State<Id, T>,
    ) -> Result<Vec<&'g Transition<Id, T>>, GraphError> {
        let mut out = Vec::with_capacity(state.out_degree());
        for tr in &state.faults {
            if self.classify_fault(levels, state, tr)? == EdgeClass::Major {
                out.push(tr);
            }
        }
        for tr in &state.recovers {
            if self.classify_recovery(levels, state, tr)? == EdgeClass::Major {
                out.push(tr);
            }
        }
        Ok(out)
    }

    /// Visit every major transition exactly once, in topological order.
    ///
    /// A state's outgoing major transitions are visited only after all of its
    /// incoming major transitions. Terminal targets are passed to the visitor
    /// but never expanded. Fails if the major transitions contain a cycle.
    pub fn visit_major_edges<V>(&self, visitor: &mut V) -> Result<(), GraphError>
    where
        V: MajorEdgeVisitor<Id, T> + ?Sized,
    {
        // Levels are complete before any edge is classified.
        let levels = self.fault_level_map()?;
        let root = self.root().ok_or(GraphError::MissingRoot)?;

        let mut in_degree: BTreeMap<&Id, usize> = BTreeMap::new();
        for state in self.nodes.values() {
            for tr in self.major_transitions(&levels, state)? {
                if !self.is_terminal(&tr.target) {
                    *in_degree.entry(&tr.target).or_default() += 1;
                }
            }
        }
        let root_degree = in_degree.get(&root.id).copied().unwrap_or(0);
        if root_degree != 0 {
            return Err(GraphError::RootHasIncomingMajorEdge {
                id: render_id(&root.id),
                in_degree: root_degree,
            });
        }

        let mut queue = VecDeque::from([root]);
        let mut processed = 0usize;
        let mut visited_edges = 0usize;
        while let Some(state) = queue.pop_front() {
            processed += 1;
            for tr in self.major_transitions(&levels, state)? {
                let target = self.resolve(state, &tr.target)?;
                visitor.visit(target, state, tr)?;
                visited_edges += 1;
                let Some(next) = target else {
                    continue;
                };
                if let Some(degree) = in_degree.get_mut(&next.id) {
                    *degree -= 1;
                    if *degree == 0 {
                        trace!(state = %render_id(&next.id), "all incoming major edges visited");
                        queue.push_back(next);
                    }
                }
            }
        }

        if processed != self.nodes.len() {
            return Err(GraphError::MajorEdgeCycle {
                processed,
                total: self.nodes.len(),
            });
        }
        debug!(processed, major_edges = visited_edges, "visited major edges");
        Ok(())
    }
}

impl<Id: StateId, T: Clone> StateGraph<Id, T> {
    /// The major transitions in the order [`visit_major_edges`](Self::visit_major_edges)
    /// visits them.
    pub fn major_edges(&self) -> Result<Vec<MajorEdge<Id, T>>, GraphError> {
        let mut edges = Vec::new();
        let mut collect = |target: Option<&State<Id, T>>,
                           source: &State<Id, T>,
                           tr: &Transition<Id, T>|
         -> Result<(), GraphError> {
            edges.push(MajorEdge {
                source: source.id.clone(),
                transition: tr.clone(),
                into_terminal: target.is_none(),
            });
            Ok(())
        };
        self.visit_major_edges(&mut collect)?;
        Ok(edges)
    }
}
