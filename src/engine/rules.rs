//! Rule evaluation: condition counting against the match requirement.

use tracing::debug;

use crate::conditions::Condition;
use crate::config::LabelRule;

/// Number of conditions matching the item's properties.
fn count_matches<C: Condition>(conditions: &[C], props: &C::Props) -> u32 {
    conditions
        .iter()
        .filter(|condition| condition.evaluate(props))
        .count() as u32
}

/// Whether the rule's label is desired for the item.
///
/// Every condition is evaluated; the count is compared against the
/// rule's requirement. Order of conditions does not affect the result.
pub fn rule_matches<C: Condition>(rule: &LabelRule<C>, props: &C::Props) -> bool {
    let matches = count_matches(&rule.conditions, props);
    debug!(
        "{matches} of {} condition(s) match, {} required",
        rule.conditions.len(),
        rule.requires
    );
    matches >= rule.requires
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::{IssueCondition, IssueProps};

    fn title_contains(value: &str) -> IssueCondition {
        IssueCondition::TitleContains {
            value: value.to_string(),
        }
    }

    fn props(title: &str) -> IssueProps {
        IssueProps {
            title: title.to_string(),
            ..IssueProps::default()
        }
    }

    fn rule(requires: u32, conditions: Vec<IssueCondition>) -> LabelRule<IssueCondition> {
        LabelRule {
            requires,
            conditions,
        }
    }

    #[test]
    fn desired_iff_matches_reach_requirement() {
        let conditions = vec![
            title_contains("crash"),
            title_contains("load"),
            title_contains("absent"),
        ];
        let p = props("App crash on load");

        // Two of three conditions match.
        assert!(rule_matches(&rule(0, conditions.clone()), &p));
        assert!(rule_matches(&rule(1, conditions.clone()), &p));
        assert!(rule_matches(&rule(2, conditions.clone()), &p));
        assert!(!rule_matches(&rule(3, conditions), &p));
    }

    #[test]
    fn zero_requirement_with_no_conditions_is_desired() {
        assert!(rule_matches(&rule(0, vec![]), &props("anything")));
    }

    #[test]
    fn unmet_requirement_with_no_conditions_is_not_desired() {
        assert!(!rule_matches(&rule(1, vec![]), &props("anything")));
    }
}
