//! Pull request conditions.
//!
//! PR conditions extend the issue set with branch, draft-status, and
//! changed-file checks. The changed-file list is not part of the
//! webhook payload; the caller fills it in from the API before rules
//! are evaluated.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{compile, Condition};

/// Computed facts about a pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrProps {
    pub title: String,
    pub body: String,
    pub creator: String,
    pub state: String,
    /// Head branch name.
    pub branch: String,
    pub is_draft: bool,
    /// Paths of the files the PR touches.
    pub files: Vec<String>,
}

/// One pull request condition from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PrCondition {
    TitleContains { value: String },
    BodyContains { value: String },
    TitleMatches { pattern: String },
    CreatorIs { user: String },
    StateIs { state: String },
    BranchMatches { pattern: String },
    TouchesFiles { pattern: String },
    IsDraft { value: bool },
    ChangedFilesAtLeast { count: usize },
    /// Unrecognised condition kind; never matches.
    #[serde(other)]
    Unknown,
}

impl Condition for PrCondition {
    type Props = PrProps;

    fn evaluate(&self, props: &PrProps) -> bool {
        match self {
            Self::TitleContains { value } => props.title.contains(value),
            Self::BodyContains { value } => props.body.contains(value),
            Self::TitleMatches { pattern } => {
                compile(pattern).is_some_and(|re| re.is_match(&props.title))
            }
            Self::CreatorIs { user } => props.creator == *user,
            Self::StateIs { state } => props.state == *state,
            Self::BranchMatches { pattern } => {
                compile(pattern).is_some_and(|re| re.is_match(&props.branch))
            }
            Self::TouchesFiles { pattern } => compile(pattern)
                .is_some_and(|re| props.files.iter().any(|file| re.is_match(file))),
            Self::IsDraft { value } => props.is_draft == *value,
            Self::ChangedFilesAtLeast { count } => props.files.len() >= *count,
            Self::Unknown => {
                warn!("unknown PR condition type in configuration, treating as no match");
                false
            }
        }
    }

    fn pattern(&self) -> Option<&str> {
        match self {
            Self::TitleMatches { pattern }
            | Self::BranchMatches { pattern }
            | Self::TouchesFiles { pattern } => Some(pattern),
            _ => None,
        }
    }

    fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}
