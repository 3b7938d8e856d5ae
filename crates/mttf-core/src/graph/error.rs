//! Errors raised while building or analysing a state graph.
//!
//! A malformed graph aborts the analysis call with one of these values
//! instead of producing a wrong answer. State ids are carried in their
//! rendered form so the error type does not depend on the id type.

use mttf_math::MatrixError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    // Construction
    #[error("root already set to {existing}, cannot make {id} the root")]
    DuplicateRoot { existing: String, id: String },

    #[error("root state {id} must not have recovery transitions")]
    RootHasRecovery { id: String },

    #[error("state {id} was added twice")]
    DuplicateState { id: String },

    #[error("id {id} is used by both an internal and a terminal state")]
    TerminalCollision { id: String },

    // References
    #[error("graph has no root state")]
    MissingRoot,

    #[error("unknown state {id}")]
    UnknownState { id: String },

    #[error("transition from {state} targets unknown state {target}")]
    UnknownTarget { state: String, target: String },

    #[error("recovery transition from {state} targets terminal state {target}")]
    RecoveryIntoTerminal { state: String, target: String },

    // Fault levels
    #[error("states not reachable from the root by fault transitions: {}", .states.join(", "))]
    Unreachable { states: Vec<String> },

    #[error("no terminal state is reachable from the root by fault transitions")]
    TerminalUnreachable,

    #[error("fault transition {state} -> {target} jumps from level {level} to level {target_level}")]
    LevelSkip {
        state: String,
        target: String,
        level: usize,
        target_level: usize,
    },

    #[error("recovery transition {state} -> {target} raises the level from {level} to {target_level}")]
    RecoveryRaisesLevel {
        state: String,
        target: String,
        level: usize,
        target_level: usize,
    },

    // Major-edge traversal
    #[error("root state {id} has {in_degree} incoming major transitions")]
    RootHasIncomingMajorEdge { id: String, in_degree: usize },

    #[error("major transitions form a cycle: processed {processed} of {total} states")]
    MajorEdgeCycle { processed: usize, total: usize },

    // Solvers
    #[error("generator matrix is singular, some state cannot reach absorption")]
    SingularGenerator,

    #[error("state {state} is entered by a major transition but has zero total recovery rate")]
    ZeroRecoveryRate { state: String },

    #[error("no flow reaches a terminal state through major transitions")]
    NoTerminalFlow,

    #[error("linear algebra failed: {0}")]
    Linear(#[from] MatrixError),
}

impl GraphError {
    /// True for errors in the graph's shape, as opposed to the solvers.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            GraphError::SingularGenerator
                | GraphError::ZeroRecoveryRate { .. }
                | GraphError::NoTerminalFlow
                | GraphError::Linear(_)
        )
    }
}

impl From<GraphError> for mttf_common::Error {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::SingularGenerator
            | GraphError::ZeroRecoveryRate { .. }
            | GraphError::NoTerminalFlow => mttf_common::Error::DegenerateSolve(err.to_string()),
            GraphError::Linear(_) => mttf_common::Error::Analysis(err.to_string()),
            _ => mttf_common::Error::MalformedGraph(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_lists_states() {
        let err = GraphError::Unreachable {
            states: vec!["3".into(), "(1, 2)".into()],
        };
        assert_eq!(
            err.to_string(),
            "states not reachable from the root by fault transitions: 3, (1, 2)"
        );
    }

    #[test]
    fn maps_into_application_codes() {
        let structural: mttf_common::Error = GraphError::MissingRoot.into();
        assert_eq!(structural.code(), 21);

        let solve: mttf_common::Error = GraphError::NoTerminalFlow.into();
        assert_eq!(solve.code(), 31);
        assert!(!GraphError::SingularGenerator.is_structural());
        assert!(GraphError::TerminalUnreachable.is_structural());
    }
}
