//! Webhook event parsing into item context.
//!
//! The labeler runs off the event payload the CI runner writes to disk.
//! Only the fields the condition handlers read are deserialised; the
//! rest of the payload is ignored.

use serde::Deserialize;
use thiserror::Error;

use crate::conditions::{IssueProps, PrProps};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("failed to parse event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The triggering item, its current labels, and its computed properties.
#[derive(Debug)]
pub enum ItemContext {
    Issue(IssueContext),
    Pr(PrContext),
}

#[derive(Debug)]
pub struct IssueContext {
    pub number: u64,
    /// Display names of the labels currently on the issue.
    pub labels: Vec<String>,
    pub props: IssueProps,
}

#[derive(Debug)]
pub struct PrContext {
    pub number: u64,
    pub labels: Vec<String>,
    /// The changed-file list starts empty; the payload does not carry
    /// it, so the caller fills it in from the API before evaluation.
    pub props: PrProps,
}

#[derive(Deserialize)]
struct EventPayload {
    issue: Option<IssuePayload>,
    pull_request: Option<PrPayload>,
}

#[derive(Deserialize)]
struct ActorPayload {
    login: String,
}

#[derive(Deserialize)]
struct LabelPayload {
    name: String,
}

#[derive(Deserialize)]
struct IssuePayload {
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    user: ActorPayload,
    #[serde(default)]
    labels: Vec<LabelPayload>,
}

#[derive(Deserialize)]
struct BranchPayload {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct PrPayload {
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    user: ActorPayload,
    #[serde(default)]
    labels: Vec<LabelPayload>,
    #[serde(default)]
    draft: bool,
    head: BranchPayload,
}

impl From<IssuePayload> for IssueContext {
    fn from(payload: IssuePayload) -> Self {
        Self {
            number: payload.number,
            labels: payload.labels.into_iter().map(|label| label.name).collect(),
            props: IssueProps {
                title: payload.title,
                body: payload.body.unwrap_or_default(),
                creator: payload.user.login,
                state: payload.state,
            },
        }
    }
}

impl From<PrPayload> for PrContext {
    fn from(payload: PrPayload) -> Self {
        Self {
            number: payload.number,
            labels: payload.labels.into_iter().map(|label| label.name).collect(),
            props: PrProps {
                title: payload.title,
                body: payload.body.unwrap_or_default(),
                creator: payload.user.login,
                state: payload.state,
                branch: payload.head.name,
                is_draft: payload.draft,
                files: Vec::new(),
            },
        }
    }
}

/// Parse the webhook payload into the item being labeled.
///
/// Pull requests win when a payload carries both keys (issue comment
/// events on PRs do). Returns `None` when the event concerns neither an
/// issue nor a pull request.
///
/// # Errors
/// Returns `ContextError::Payload` if the payload is not valid JSON or
/// is missing fields the engine needs.
pub fn parse_event(payload: &str) -> Result<Option<ItemContext>, ContextError> {
    let event: EventPayload = serde_json::from_str(payload)?;
    if let Some(pr) = event.pull_request {
        return Ok(Some(ItemContext::Pr(pr.into())));
    }
    if let Some(issue) = event.issue {
        return Ok(Some(ItemContext::Issue(issue.into())));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_issue_event() {
        let payload = r#"{
            "action": "opened",
            "issue": {
                "number": 42,
                "title": "App crash on load",
                "body": "It falls over immediately.",
                "state": "open",
                "user": { "login": "octocat" },
                "labels": [{ "name": "bug" }]
            }
        }"#;

        let Some(ItemContext::Issue(ctx)) = parse_event(payload).unwrap() else {
            panic!("expected an issue context");
        };
        assert_eq!(ctx.number, 42);
        assert_eq!(ctx.labels, ["bug"]);
        assert_eq!(ctx.props.title, "App crash on load");
        assert_eq!(ctx.props.creator, "octocat");
    }

    #[test]
    fn parses_pr_event() {
        let payload = r#"{
            "action": "opened",
            "pull_request": {
                "number": 7,
                "title": "Fix login flow",
                "body": null,
                "state": "open",
                "draft": true,
                "user": { "login": "octocat" },
                "labels": [],
                "head": { "ref": "fix/login" }
            }
        }"#;

        let Some(ItemContext::Pr(ctx)) = parse_event(payload).unwrap() else {
            panic!("expected a PR context");
        };
        assert_eq!(ctx.number, 7);
        assert!(ctx.labels.is_empty());
        assert_eq!(ctx.props.branch, "fix/login");
        assert!(ctx.props.is_draft);
        assert_eq!(ctx.props.body, "");
        assert!(ctx.props.files.is_empty());
    }

    #[test]
    fn event_without_item_is_none() {
        let payload = r#"{ "action": "created", "comment": { "body": "hi" } }"#;
        assert!(parse_event(payload).unwrap().is_none());
    }

    #[test]
    fn garbage_payload_is_an_error() {
        assert!(parse_event("not json").is_err());
    }
}
