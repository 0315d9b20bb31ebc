//! Fallback-label activation over the final non-fallback count.
//!
//! Fallback labels mark under-classified items. Once every ordinary
//! rule has been reconciled, the item's non-fallback label count is
//! compared against the activation threshold: at or below it, every
//! fallback label is forced on; above it, every fallback label is
//! forced off. Fallback labels themselves never count.

use crate::config::Fallback;

/// Currently-present labels that are not fallback labels.
///
/// The count is recomputed from scratch each run and then adjusted by
/// the per-rule reconciliation deltas.
pub fn initial_non_fallback_count(current: &[String], fallback_names: &[&str]) -> i64 {
    current
        .iter()
        .filter(|label| !fallback_names.contains(&label.as_str()))
        .count() as i64
}

/// Whether the non-fallback count is low enough to force fallback labels on.
pub fn should_activate(non_fallback: i64, fallback: &Fallback) -> bool {
    non_fallback <= i64::from(fallback.activation_threshold())
}
