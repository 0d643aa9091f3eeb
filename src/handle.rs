use std::collections::BTreeSet;

use tracing::info;

use crate::error::Result;

/// Reaction content accepted by the GitHub reactions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    PlusOne,
}

impl Reaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reaction::PlusOne => "+1",
        }
    }
}

/// Mutations available on a single pull request.
///
/// Adding something already present and removing an assignee that is not
/// assigned must both succeed. `remove_label` is only called for labels
/// confirmed present by a preceding `list_labels`.
pub trait PullRequestHandle {
    fn list_labels(&self) -> Result<BTreeSet<String>>;

    fn add_label(&self, name: &str) -> Result<()>;

    fn remove_label(&self, name: &str) -> Result<()>;

    fn add_assignees(&self, logins: &[String]) -> Result<()>;

    /// Must accept an empty list.
    fn remove_assignees(&self, logins: &[String]) -> Result<()>;

    fn react_to_comment(&self, comment_id: u64, reaction: Reaction) -> Result<()>;
}

impl<H: PullRequestHandle + ?Sized> PullRequestHandle for &H {
    fn list_labels(&self) -> Result<BTreeSet<String>> {
        (**self).list_labels()
    }

    fn add_label(&self, name: &str) -> Result<()> {
        (**self).add_label(name)
    }

    fn remove_label(&self, name: &str) -> Result<()> {
        (**self).remove_label(name)
    }

    fn add_assignees(&self, logins: &[String]) -> Result<()> {
        (**self).add_assignees(logins)
    }

    fn remove_assignees(&self, logins: &[String]) -> Result<()> {
        (**self).remove_assignees(logins)
    }

    fn react_to_comment(&self, comment_id: u64, reaction: Reaction) -> Result<()> {
        (**self).react_to_comment(comment_id, reaction)
    }
}

/// Reads pass through; mutations are logged and skipped.
pub struct DryRun<H> {
    inner: H,
}

impl<H: PullRequestHandle> DryRun<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: PullRequestHandle> PullRequestHandle for DryRun<H> {
    fn list_labels(&self) -> Result<BTreeSet<String>> {
        self.inner.list_labels()
    }

    fn add_label(&self, name: &str) -> Result<()> {
        info!(label = name, "dry run: would add label");
        Ok(())
    }

    fn remove_label(&self, name: &str) -> Result<()> {
        info!(label = name, "dry run: would remove label");
        Ok(())
    }

    fn add_assignees(&self, logins: &[String]) -> Result<()> {
        info!(?logins, "dry run: would add assignees");
        Ok(())
    }

    fn remove_assignees(&self, logins: &[String]) -> Result<()> {
        info!(?logins, "dry run: would remove assignees");
        Ok(())
    }

    fn react_to_comment(&self, comment_id: u64, reaction: Reaction) -> Result<()> {
        info!(
            comment_id,
            reaction = reaction.as_str(),
            "dry run: would react to comment"
        );
        Ok(())
    }
}
