use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    ReviewRequested,
    AuthorAssigned,
    Unauthorized,
    NoMatchingTrigger,
    NotApplicable,
}

/// Terminal result of one invocation. Every variant exits cleanly; fatal
/// failures are `crate::error::Error` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub message: String,
}

impl Outcome {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status != Status::Unauthorized
    }

    /// True when labels and assignees were changed.
    pub fn transitioned(&self) -> bool {
        matches!(self.status, Status::ReviewRequested | Status::AuthorAssigned)
    }

    pub fn report(&self) {
        match self.status {
            Status::NotApplicable => info!("{}", self.message),
            Status::Unauthorized => warn!("warning: {}", self.message),
            _ => info!("success: {}", self.message),
        }
    }
}
