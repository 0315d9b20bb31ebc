//! # Label Decision and Reconciliation Engine
//!
//! Pure logic: given the parsed item context, the configured rules, and
//! the item's current labels, produce the ordered mutation sequence
//! that converges the label set on the desired state. The engine
//! performs no I/O and holds no state between runs; identical inputs
//! always yield an identical operation sequence.

pub mod driver;
pub mod fallback;
pub mod reconcile;
pub mod rules;

pub use driver::run;
pub use reconcile::{LabelAction, Operation};
