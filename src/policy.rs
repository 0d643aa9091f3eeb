use crate::config::Rules;
use crate::trigger::Trigger;

/// What the commenter is allowed to do on this pull request.
///
/// Role facts gate actions; they never choose one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleFacts {
    pub commenter_is_reviewer: bool,
    pub commenter_is_author: bool,
}

impl RoleFacts {
    /// Author equality is an exact, case-sensitive login comparison, like
    /// [`Rules::is_reviewer`].
    pub fn derive(trigger: &Trigger, rules: &Rules) -> Self {
        Self {
            commenter_is_reviewer: rules.is_reviewer(&trigger.commenter),
            commenter_is_author: trigger.commenter == trigger.author,
        }
    }

    pub fn may_assign_author(&self) -> bool {
        self.commenter_is_reviewer
    }

    pub fn may_request_review(&self) -> bool {
        self.commenter_is_reviewer || self.commenter_is_author
    }
}
