/// Which of the two inbound event shapes a trigger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Comment,
    Review,
}

/// Shape-independent record of who wrote what on which pull request.
///
/// Built once by [`crate::event::normalize`]. Identity fields keep their
/// original case; only `body` is lower-cased so trigger matching is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub commenter: String,
    pub author: String,
    pub pull_request: u64,
    pub body: String,
    pub kind: EventKind,
    /// Set only for reviews submitted with "changes requested".
    pub force_assign_author: bool,
    pub comment_id: Option<u64>,
}

impl Trigger {
    /// The comment to acknowledge once an action succeeds. Reviews have none.
    pub fn reaction_target(&self) -> Option<u64> {
        match self.kind {
            EventKind::Comment => self.comment_id,
            EventKind::Review => None,
        }
    }
}
