//! End-to-end label decision for one item.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::conditions::Condition;
use crate::config::{Fallback, LabelRule};

use super::fallback;
use super::reconcile::{reconcile, Operation};
use super::rules::rule_matches;

/// Resolve a label identifier to its display name.
///
/// Identifiers are validated against the label table before the driver
/// runs, so the lookup only falls through for untabled test input.
fn display_name<'a>(names: &'a HashMap<String, String>, id: &'a str) -> &'a str {
    names.get(id).map_or(id, String::as_str)
}

/// Decide the full operation sequence for one item.
///
/// If the skip label is present the item is left untouched. Otherwise
/// rules are reconciled in configuration order while the non-fallback
/// label count is folded alongside the operations; fallback labels are
/// resolved last, against the final count, and their operations are
/// appended in fallback-list order.
pub fn run<C: Condition>(
    rules: &IndexMap<String, LabelRule<C>>,
    fallback_spec: &Fallback,
    skip_label: &str,
    names: &HashMap<String, String>,
    props: &C::Props,
    current: &[String],
) -> Vec<Operation> {
    let skip_name = display_name(names, skip_label);
    if current.iter().any(|label| label == skip_name) {
        info!("skip label \"{skip_name}\" present, leaving labels untouched");
        return Vec::new();
    }

    let fallback_names: Vec<&str> = fallback_spec
        .labels()
        .iter()
        .map(|id| display_name(names, id))
        .collect();

    let initial = fallback::initial_non_fallback_count(current, &fallback_names);

    let (mut operations, non_fallback) = rules.iter().fold(
        (Vec::new(), initial),
        |(mut operations, count), (id, rule)| {
            let name = display_name(names, id);
            // Fallback-set labels are governed by fallback activation
            // alone; a rule on one would otherwise fight it and leak
            // into the non-fallback count.
            if fallback_names.contains(&name) {
                debug!("rule \"{id}\" targets a fallback label, deferring to fallback activation");
                return (operations, count);
            }
            debug!("evaluating rule \"{id}\"");
            let desired = rule_matches(rule, props);
            let (op, delta) = reconcile(name, desired, current);
            if let Some(op) = op {
                operations.push(op);
            }
            (operations, count + delta)
        },
    );

    let activate = fallback::should_activate(non_fallback, fallback_spec);
    debug!(
        "{non_fallback} non-fallback label(s) after rules, fallback labels {}",
        if activate { "on" } else { "off" }
    );

    for name in fallback_names {
        let (op, _) = reconcile(name, activate, current);
        if let Some(op) = op {
            operations.push(op);
        }
    }

    operations
}
