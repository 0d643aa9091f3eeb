use std::fmt;

/// The lifecycle transition selected for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RequestReview,
    AssignAuthor,
    NoOp { reason: String },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::RequestReview => write!(f, "request-review"),
            Action::AssignAuthor => write!(f, "assign-author"),
            Action::NoOp { .. } => write!(f, "no-op"),
        }
    }
}

/// Pick the action for an already lower-cased body.
///
/// The review trigger always wins: a body containing both phrases requests a
/// review, and `force_assign_author` only applies when the review trigger is
/// absent.
pub fn select_action(
    body: &str,
    force_assign_author: bool,
    request_review_trigger: &str,
    request_update_trigger: &str,
) -> Action {
    if body.contains(request_review_trigger) {
        Action::RequestReview
    } else if body.contains(request_update_trigger) || force_assign_author {
        Action::AssignAuthor
    } else {
        Action::NoOp {
            reason: format!(
                "neither \"{request_review_trigger}\" nor \"{request_update_trigger}\" found in comment body, not proceeding"
            ),
        }
    }
}
