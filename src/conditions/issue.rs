//! Issue conditions.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{compile, Condition};

/// Computed facts about an issue, extracted from the event payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueProps {
    pub title: String,
    pub body: String,
    pub creator: String,
    pub state: String,
}

/// One issue condition from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IssueCondition {
    TitleContains { value: String },
    BodyContains { value: String },
    TitleMatches { pattern: String },
    CreatorIs { user: String },
    StateIs { state: String },
    /// Unrecognised condition kind; never matches.
    #[serde(other)]
    Unknown,
}

impl Condition for IssueCondition {
    type Props = IssueProps;

    fn evaluate(&self, props: &IssueProps) -> bool {
        match self {
            Self::TitleContains { value } => props.title.contains(value),
            Self::BodyContains { value } => props.body.contains(value),
            Self::TitleMatches { pattern } => {
                compile(pattern).is_some_and(|re| re.is_match(&props.title))
            }
            Self::CreatorIs { user } => props.creator == *user,
            Self::StateIs { state } => props.state == *state,
            Self::Unknown => {
                warn!("unknown issue condition type in configuration, treating as no match");
                false
            }
        }
    }

    fn pattern(&self) -> Option<&str> {
        match self {
            Self::TitleMatches { pattern } => Some(pattern),
            _ => None,
        }
    }

    fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}
