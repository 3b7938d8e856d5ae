//! Edges of the state graph.

use std::fmt;

/// Label given to fault transitions unless the builder names them.
pub const FAULT_LABEL: &str = "fault";

/// Label given to recovery transitions unless the builder names them.
pub const RECOVER_LABEL: &str = "recover";

/// A transition to `target` happening at exponential `rate`.
///
/// Whether a transition counts as a fault or a recovery is decided by the
/// list it is stored in on its [`State`](super::State); the label is only used
/// for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<Id, T> {
    pub target: Id,
    pub rate: T,
    pub label: String,
}

impl<Id, T> Transition<Id, T> {
    pub fn new(target: Id, rate: T, label: impl Into<String>) -> Self {
        Transition {
            target,
            rate,
            label: label.into(),
        }
    }

    /// Replace the rendering label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Fault transition labelled `fault`.
pub fn fault<Id, T>(target: Id, rate: T) -> Transition<Id, T> {
    Transition::new(target, rate, FAULT_LABEL)
}

/// Recovery transition labelled `recover`.
pub fn recover<Id, T>(target: Id, rate: T) -> Transition<Id, T> {
    Transition::new(target, rate, RECOVER_LABEL)
}

/// Renders a state id the way graph listings and error messages show it.
pub(crate) fn render_id<Id: fmt::Debug>(id: &Id) -> String {
    format!("{:?}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_labels() {
        let f = fault(1u32, 2.0);
        assert_eq!(f.label, "fault");
        let r = recover(0u32, 1.5).with_label("rebuild");
        assert_eq!(r.label, "rebuild");
        assert_eq!(r.target, 0);
    }

    #[test]
    fn tuple_ids_render_like_tuples() {
        assert_eq!(render_id(&(1u32, 0u32)), "(1, 0)");
        assert_eq!(render_id(&7u32), "7");
    }
}
