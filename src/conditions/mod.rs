//! # Condition Types and Evaluation
//!
//! Conditions are the leaves of the labeling configuration: each one is
//! a tagged variant evaluated against the triggering item's computed
//! properties. The variant set is closed; a condition whose `type` tag
//! is not recognised deserialises to the `Unknown` variant, which never
//! matches and is logged at WARN so that configuration typos stay
//! visible to operators.

pub mod issue;
pub mod pr;

pub use issue::{IssueCondition, IssueProps};
pub use pr::{PrCondition, PrProps};

use regex::Regex;
use tracing::warn;

/// A configuration condition evaluated against one item's properties.
pub trait Condition {
    type Props;

    /// Whether the condition matches. Unknown kinds never match.
    fn evaluate(&self, props: &Self::Props) -> bool;

    /// The regex pattern carried by the condition, if it has one.
    /// Patterns are validated when the configuration is loaded.
    fn pattern(&self) -> Option<&str> {
        None
    }

    /// Whether this is the unrecognised-kind variant.
    fn is_unknown(&self) -> bool {
        false
    }
}

/// Compile a condition pattern, logging instead of failing on a bad one.
///
/// Patterns are checked during configuration validation, so a compile
/// error here means evaluation was reached without validation; the
/// condition is treated as not matching.
pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!("invalid condition pattern \"{pattern}\": {err}");
            None
        }
    }
}
