//! Minimal diffing between one label's desired and current state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mutation direction for one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelAction {
    Add,
    Remove,
}

impl fmt::Display for LabelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

/// One externally visible label mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub action: LabelAction,
    /// Display name of the label, as the platform knows it.
    pub label: String,
}

impl Operation {
    pub fn add(label: impl Into<String>) -> Self {
        Self {
            action: LabelAction::Add,
            label: label.into(),
        }
    }

    pub fn remove(label: impl Into<String>) -> Self {
        Self {
            action: LabelAction::Remove,
            label: label.into(),
        }
    }
}

/// Diff one label's desired state against the current label set.
///
/// Returns the operation needed to converge, if any, and the net change
/// to the present-label count: +1 for an add, -1 for a remove, 0 when
/// the label is already in the desired state.
pub fn reconcile(label_name: &str, desired: bool, current: &[String]) -> (Option<Operation>, i64) {
    let present = current.iter().any(|label| label == label_name);
    match (desired, present) {
        (true, false) => (Some(Operation::add(label_name)), 1),
        (false, true) => (Some(Operation::remove(label_name)), -1),
        _ => (None, 0),
    }
}
