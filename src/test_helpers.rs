use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use crate::config::Rules;
use crate::error::{Error, Result};
use crate::handle::{PullRequestHandle, Reaction};

/// `Rules` used across tests: reviewers alice and bob.
pub fn default_test_rules() -> Rules {
    Rules {
        reviewers: vec!["alice".to_string(), "bob".to_string()],
        request_review_trigger: "please review".to_string(),
        request_update_trigger: "please update".to_string(),
        awaiting_update_label: "awaiting-update".to_string(),
        awaiting_review_label: "awaiting-review".to_string(),
    }
}

/// In-memory pull request that enforces the handle contract.
///
/// Removing a label that is not present fails, the same way the real API
/// answers 404, so callers must check `list_labels` first.
#[derive(Debug, Default)]
pub struct MemoryPullRequest {
    labels: RefCell<BTreeSet<String>>,
    assignees: RefCell<BTreeSet<String>>,
    reactions: RefCell<Vec<(u64, Reaction)>>,
    calls: RefCell<Vec<String>>,
    mutations: Cell<usize>,
    fail_on: Option<&'static str>,
}

impl MemoryPullRequest {
    pub fn new(labels: &[&str], assignees: &[&str]) -> Self {
        Self {
            labels: RefCell::new(labels.iter().map(|l| l.to_string()).collect()),
            assignees: RefCell::new(assignees.iter().map(|a| a.to_string()).collect()),
            ..Default::default()
        }
    }

    /// Make the named operation (e.g. `"add_label"`) return an API error.
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub fn labels(&self) -> BTreeSet<String> {
        self.labels.borrow().clone()
    }

    pub fn assignees(&self) -> BTreeSet<String> {
        self.assignees.borrow().clone()
    }

    pub fn reactions(&self) -> Vec<(u64, Reaction)> {
        self.reactions.borrow().clone()
    }

    /// Operation names in call order, reads included.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.get()
    }

    fn record(&self, operation: &str, mutates: bool) -> Result<()> {
        self.calls.borrow_mut().push(operation.to_string());
        if self.fail_on == Some(operation) {
            return Err(Error::GitHub(format!("{operation} failed: 502 Bad Gateway")));
        }
        if mutates {
            self.mutations.set(self.mutations.get() + 1);
        }
        Ok(())
    }
}

impl PullRequestHandle for MemoryPullRequest {
    fn list_labels(&self) -> Result<BTreeSet<String>> {
        self.record("list_labels", false)?;
        Ok(self.labels())
    }

    fn add_label(&self, name: &str) -> Result<()> {
        self.record("add_label", true)?;
        self.labels.borrow_mut().insert(name.to_string());
        Ok(())
    }

    fn remove_label(&self, name: &str) -> Result<()> {
        self.record("remove_label", true)?;
        if !self.labels.borrow_mut().remove(name) {
            return Err(Error::GitHub(format!("label {name} not found")));
        }
        Ok(())
    }

    fn add_assignees(&self, logins: &[String]) -> Result<()> {
        self.record("add_assignees", true)?;
        self.assignees.borrow_mut().extend(logins.iter().cloned());
        Ok(())
    }

    fn remove_assignees(&self, logins: &[String]) -> Result<()> {
        self.record("remove_assignees", true)?;
        let mut assignees = self.assignees.borrow_mut();
        for login in logins {
            assignees.remove(login);
        }
        Ok(())
    }

    fn react_to_comment(&self, comment_id: u64, reaction: Reaction) -> Result<()> {
        self.record("react_to_comment", true)?;
        self.reactions.borrow_mut().push((comment_id, reaction));
        Ok(())
    }
}
