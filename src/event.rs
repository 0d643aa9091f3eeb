use std::path::Path;

use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::debug;

use crate::error::{Error, Result};
use crate::trigger::{EventKind, Trigger};

pub const ISSUE_COMMENT: &str = "issue_comment";
pub const PULL_REQUEST_REVIEW: &str = "pull_request_review";

const NOT_A_PULL_REQUEST: &str = "action only applies to pull requests, not issues";

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// Missing ids only disable the acknowledgement reaction.
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub body: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub user: User,
    /// Present only when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<IgnoredAny>,
}

/// `issue_comment` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentEvent {
    pub comment: Comment,
    pub issue: Issue,
}

/// Webhook payloads use snake_case states, the REST API uses SCREAMING_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    #[serde(alias = "APPROVED")]
    Approved,
    #[serde(alias = "CHANGES_REQUESTED")]
    ChangesRequested,
    #[serde(alias = "COMMENTED")]
    Commented,
    #[serde(alias = "DISMISSED")]
    Dismissed,
    #[serde(alias = "PENDING")]
    Pending,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub body: Option<String>,
    pub user: User,
    pub state: ReviewState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub user: User,
}

/// `pull_request_review` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewEvent {
    pub review: Review,
    pub pull_request: PullRequest,
}

/// One of the two payload shapes this bot understands.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEvent {
    Review(ReviewEvent),
    Comment(CommentEvent),
}

/// Result of normalization: either a trigger to act on, or a reason to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Trigger(Trigger),
    NotApplicable(String),
}

/// Parse a raw payload. With an event name the shape is fixed by it,
/// otherwise it is inferred from the fields present.
pub fn parse_event(event_name: Option<&str>, content: &str) -> Result<RawEvent> {
    let event = match event_name {
        Some(ISSUE_COMMENT) => RawEvent::Comment(serde_json::from_str(content)?),
        Some(PULL_REQUEST_REVIEW) => RawEvent::Review(serde_json::from_str(content)?),
        Some(other) => return Err(Error::UnsupportedEvent(other.to_string())),
        None => serde_json::from_str(content)?,
    };
    Ok(event)
}

pub fn load_event(path: &Path, event_name: Option<&str>) -> Result<RawEvent> {
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "read event payload");
    parse_event(event_name, &content)
}

pub fn normalize(event: RawEvent) -> Normalized {
    match event {
        RawEvent::Comment(CommentEvent { comment, issue }) => {
            if issue.pull_request.is_none() {
                return Normalized::NotApplicable(NOT_A_PULL_REQUEST.to_string());
            }
            Normalized::Trigger(Trigger {
                commenter: comment.user.login,
                author: issue.user.login,
                pull_request: issue.number,
                body: comment.body.to_lowercase(),
                kind: EventKind::Comment,
                force_assign_author: false,
                comment_id: comment.id,
            })
        }
        RawEvent::Review(ReviewEvent {
            review,
            pull_request,
        }) => Normalized::Trigger(Trigger {
            commenter: review.user.login,
            author: pull_request.user.login,
            pull_request: pull_request.number,
            body: review.body.unwrap_or_default().to_lowercase(),
            kind: EventKind::Review,
            force_assign_author: review.state == ReviewState::ChangesRequested,
            comment_id: None,
        }),
    }
}
