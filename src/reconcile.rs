use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::Rules;
use crate::error::Result;
use crate::handle::PullRequestHandle;
use crate::matcher::Action;
use crate::outcome::{Outcome, Status};
use crate::policy::RoleFacts;
use crate::trigger::Trigger;

/// Label and assignee changes that move a pull request into one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationPlan {
    pub label_to_add: String,
    pub label_to_remove: String,
    pub assignees_to_add: BTreeSet<String>,
    pub assignees_to_remove: BTreeSet<String>,
}

impl MutationPlan {
    /// Hand the pull request back to its author.
    pub fn assign_author(rules: &Rules, trigger: &Trigger) -> Self {
        Self {
            label_to_add: rules.awaiting_update_label.clone(),
            label_to_remove: rules.awaiting_review_label.clone(),
            assignees_to_add: BTreeSet::from([trigger.author.clone()]),
            assignees_to_remove: rules
                .reviewers
                .iter()
                .filter(|r| **r != trigger.author)
                .cloned()
                .collect(),
        }
    }

    /// Hand the pull request to the reviewers.
    pub fn request_review(rules: &Rules, trigger: &Trigger) -> Self {
        let mut assignees_to_remove = BTreeSet::new();
        if !rules.is_reviewer(&trigger.author) {
            assignees_to_remove.insert(trigger.author.clone());
        }
        Self {
            label_to_add: rules.awaiting_review_label.clone(),
            label_to_remove: rules.awaiting_update_label.clone(),
            assignees_to_add: rules.reviewers.iter().cloned().collect(),
            assignees_to_remove,
        }
    }

    /// Apply in order: add label, drop the opposite label, add then remove
    /// assignees. Every step tolerates the target state already holding.
    pub fn apply<H: PullRequestHandle>(&self, handle: &H) -> Result<()> {
        handle.add_label(&self.label_to_add)?;
        info!(label = %self.label_to_add, "label added");

        remove_label_if_present(handle, &self.label_to_remove)?;

        if self.assignees_to_add.is_empty() {
            debug!("no assignees to add");
        } else {
            let logins: Vec<String> = self.assignees_to_add.iter().cloned().collect();
            handle.add_assignees(&logins)?;
            info!(?logins, "assignees added");
        }

        if self.assignees_to_remove.is_empty() {
            debug!("no assignees to remove");
        } else {
            let logins: Vec<String> = self.assignees_to_remove.iter().cloned().collect();
            handle.remove_assignees(&logins)?;
            info!(?logins, "assignees removed");
        }

        Ok(())
    }
}

/// Labels are re-read right before removal so a label someone else already
/// removed is skipped instead of failing.
fn remove_label_if_present<H: PullRequestHandle>(handle: &H, label: &str) -> Result<()> {
    let current = handle.list_labels()?;
    match current.iter().find(|l| l.to_lowercase() == label) {
        Some(existing) => {
            handle.remove_label(existing)?;
            info!(label = %existing, "label removed");
        }
        None => debug!(label, "label not present, nothing to remove"),
    }
    Ok(())
}

pub fn assign_author<H: PullRequestHandle>(
    rules: &Rules,
    trigger: &Trigger,
    roles: RoleFacts,
    handle: &H,
) -> Result<Outcome> {
    if !roles.may_assign_author() {
        return Ok(Outcome::new(
            Status::Unauthorized,
            format!(
                "Only reviewers {} can assign the author, not {}",
                rules.show_reviewers(),
                trigger.commenter
            ),
        ));
    }

    MutationPlan::assign_author(rules, trigger).apply(handle)?;
    Ok(Outcome::new(
        Status::AuthorAssigned,
        format!(
            "Author {} successfully assigned to PR, \"{}\" label added",
            trigger.author, rules.awaiting_update_label
        ),
    ))
}

pub fn request_review<H: PullRequestHandle>(
    rules: &Rules,
    trigger: &Trigger,
    roles: RoleFacts,
    handle: &H,
) -> Result<Outcome> {
    if !roles.may_request_review() {
        return Ok(Outcome::new(
            Status::Unauthorized,
            format!(
                "Only the PR author {} or reviewers can request a review, not {}",
                trigger.author, trigger.commenter
            ),
        ));
    }

    MutationPlan::request_review(rules, trigger).apply(handle)?;
    Ok(Outcome::new(
        Status::ReviewRequested,
        format!(
            "Reviewers {} successfully assigned to PR, \"{}\" label added",
            rules.show_reviewers(),
            rules.awaiting_review_label
        ),
    ))
}

/// Dispatch a selected action to its handler. `NoOp` never touches the handle.
pub fn execute<H: PullRequestHandle>(
    action: &Action,
    rules: &Rules,
    trigger: &Trigger,
    roles: RoleFacts,
    handle: &H,
) -> Result<Outcome> {
    match action {
        Action::RequestReview => request_review(rules, trigger, roles, handle),
        Action::AssignAuthor => assign_author(rules, trigger, roles, handle),
        Action::NoOp { reason } => Ok(Outcome::new(Status::NoMatchingTrigger, reason.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MemoryPullRequest, default_test_rules};
    use crate::trigger::EventKind;

    fn make_trigger(commenter: &str, author: &str) -> Trigger {
        Trigger {
            commenter: commenter.to_string(),
            author: author.to_string(),
            pull_request: 3,
            body: String::new(),
            kind: EventKind::Comment,
            force_assign_author: false,
            comment_id: Some(77),
        }
    }

    fn roles_for(rules: &Rules, trigger: &Trigger) -> RoleFacts {
        RoleFacts::derive(trigger, rules)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plan_assign_author() {
        let rules = default_test_rules();
        let plan = MutationPlan::assign_author(&rules, &make_trigger("alice", "carol"));
        assert_eq!(plan.label_to_add, "awaiting-update");
        assert_eq!(plan.label_to_remove, "awaiting-review");
        assert_eq!(plan.assignees_to_add, set(&["carol"]));
        assert_eq!(plan.assignees_to_remove, set(&["alice", "bob"]));
    }

    #[test]
    fn test_plan_assign_author_excludes_author_from_removal() {
        let rules = default_test_rules();
        let plan = MutationPlan::assign_author(&rules, &make_trigger("alice", "bob"));
        assert_eq!(plan.assignees_to_add, set(&["bob"]));
        assert_eq!(plan.assignees_to_remove, set(&["alice"]));
    }

    #[test]
    fn test_plan_request_review() {
        let rules = default_test_rules();
        let plan = MutationPlan::request_review(&rules, &make_trigger("alice", "carol"));
        assert_eq!(plan.label_to_add, "awaiting-review");
        assert_eq!(plan.label_to_remove, "awaiting-update");
        assert_eq!(plan.assignees_to_add, set(&["alice", "bob"]));
        assert_eq!(plan.assignees_to_remove, set(&["carol"]));
    }

    #[test]
    fn test_plan_request_review_keeps_reviewer_author() {
        let rules = default_test_rules();
        let plan = MutationPlan::request_review(&rules, &make_trigger("bob", "bob"));
        assert!(plan.assignees_to_remove.is_empty());
    }

    #[test]
    fn test_request_review_by_reviewer() {
        let rules = default_test_rules();
        let trigger = make_trigger("alice", "carol");
        let pr = MemoryPullRequest::new(&["awaiting-update", "bug"], &["carol"]);
        let outcome = request_review(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert_eq!(outcome.status, Status::ReviewRequested);
        assert_eq!(
            outcome.message,
            r#"Reviewers "alice", "bob" successfully assigned to PR, "awaiting-review" label added"#
        );
        assert_eq!(pr.labels(), set(&["awaiting-review", "bug"]));
        assert_eq!(pr.assignees(), set(&["alice", "bob"]));
    }

    #[test]
    fn test_request_review_by_author() {
        let rules = default_test_rules();
        let trigger = make_trigger("carol", "carol");
        let pr = MemoryPullRequest::new(&[], &["carol"]);
        let outcome = request_review(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert_eq!(outcome.status, Status::ReviewRequested);
        assert_eq!(pr.assignees(), set(&["alice", "bob"]));
        assert_eq!(pr.labels(), set(&["awaiting-review"]));
    }

    #[test]
    fn test_request_review_by_outsider_rejected() {
        let rules = default_test_rules();
        let trigger = make_trigger("dave", "carol");
        let pr = MemoryPullRequest::new(&["awaiting-update"], &["carol"]);
        let outcome = request_review(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert_eq!(outcome.status, Status::Unauthorized);
        assert_eq!(
            outcome.message,
            "Only the PR author carol or reviewers can request a review, not dave"
        );
        assert!(pr.calls().is_empty());
    }

    #[test]
    fn test_assign_author_by_reviewer() {
        let rules = default_test_rules();
        let trigger = make_trigger("bob", "carol");
        let pr = MemoryPullRequest::new(&["awaiting-review"], &["alice", "bob"]);
        let outcome = assign_author(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert_eq!(outcome.status, Status::AuthorAssigned);
        assert_eq!(
            outcome.message,
            r#"Author carol successfully assigned to PR, "awaiting-update" label added"#
        );
        assert_eq!(pr.labels(), set(&["awaiting-update"]));
        assert_eq!(pr.assignees(), set(&["carol"]));
    }

    #[test]
    fn test_assign_author_by_author_rejected() {
        let rules = default_test_rules();
        let trigger = make_trigger("carol", "carol");
        let pr = MemoryPullRequest::new(&[], &[]);
        let outcome = assign_author(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert_eq!(outcome.status, Status::Unauthorized);
        assert_eq!(
            outcome.message,
            r#"Only reviewers "alice", "bob" can assign the author, not carol"#
        );
        assert_eq!(pr.mutation_count(), 0);
    }

    #[test]
    fn test_assign_author_by_outsider_rejected() {
        let rules = default_test_rules();
        let trigger = make_trigger("dave", "carol");
        let pr = MemoryPullRequest::new(&["awaiting-review"], &["alice"]);
        let outcome = assign_author(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert!(!outcome.succeeded());
        assert_eq!(pr.labels(), set(&["awaiting-review"]));
        assert_eq!(pr.assignees(), set(&["alice"]));
        assert!(pr.calls().is_empty());
    }

    #[test]
    fn test_absent_label_is_not_removed() {
        let rules = default_test_rules();
        let trigger = make_trigger("alice", "carol");
        let pr = MemoryPullRequest::new(&[], &[]);
        assign_author(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert!(!pr.calls().contains(&"remove_label".to_string()));
    }

    #[test]
    fn test_mutation_order() {
        let rules = default_test_rules();
        let trigger = make_trigger("alice", "carol");
        let pr = MemoryPullRequest::new(&["awaiting-review"], &[]);
        assign_author(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert_eq!(
            pr.calls(),
            vec![
                "add_label",
                "list_labels",
                "remove_label",
                "add_assignees",
                "remove_assignees"
            ]
        );
    }

    #[test]
    fn test_existing_label_with_different_case_is_removed() {
        let rules = default_test_rules();
        let trigger = make_trigger("alice", "carol");
        let pr = MemoryPullRequest::new(&["Awaiting-Review"], &[]);
        assign_author(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert_eq!(pr.labels(), set(&["awaiting-update"]));
    }

    #[test]
    fn test_assign_author_is_idempotent() {
        let rules = default_test_rules();
        let trigger = make_trigger("alice", "carol");
        let roles = roles_for(&rules, &trigger);
        let pr = MemoryPullRequest::new(&["awaiting-review"], &["alice", "bob"]);
        assign_author(&rules, &trigger, roles, &pr).unwrap();
        let (labels, assignees) = (pr.labels(), pr.assignees());
        assign_author(&rules, &trigger, roles, &pr).unwrap();
        assert_eq!(pr.labels(), labels);
        assert_eq!(pr.assignees(), assignees);
    }

    #[test]
    fn test_request_review_is_idempotent() {
        let rules = default_test_rules();
        let trigger = make_trigger("carol", "carol");
        let roles = roles_for(&rules, &trigger);
        let pr = MemoryPullRequest::new(&["awaiting-update"], &["carol"]);
        request_review(&rules, &trigger, roles, &pr).unwrap();
        let (labels, assignees) = (pr.labels(), pr.assignees());
        request_review(&rules, &trigger, roles, &pr).unwrap();
        assert_eq!(pr.labels(), labels);
        assert_eq!(pr.assignees(), assignees);
    }

    #[test]
    fn test_state_labels_stay_mutually_exclusive() {
        let rules = default_test_rules();
        let reviewer = make_trigger("alice", "carol");
        let author = make_trigger("carol", "carol");
        let pr = MemoryPullRequest::new(&["awaiting-review", "awaiting-update"], &[]);
        for step in 0..4 {
            if step % 2 == 0 {
                assign_author(&rules, &reviewer, roles_for(&rules, &reviewer), &pr).unwrap();
            } else {
                request_review(&rules, &author, roles_for(&rules, &author), &pr).unwrap();
            }
            let labels = pr.labels();
            assert!(
                !(labels.contains("awaiting-review") && labels.contains("awaiting-update")),
                "both state labels present after step {step}: {labels:?}"
            );
        }
    }

    #[test]
    fn test_no_reviewers_request_review_only_drops_author() {
        let rules = Rules {
            reviewers: vec![],
            ..default_test_rules()
        };
        let trigger = make_trigger("carol", "carol");
        let pr = MemoryPullRequest::new(&[], &["carol"]);
        request_review(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert!(pr.assignees().is_empty());
        assert!(!pr.calls().contains(&"add_assignees".to_string()));
    }

    #[test]
    fn test_remote_error_propagates() {
        let rules = default_test_rules();
        let trigger = make_trigger("alice", "carol");
        let pr = MemoryPullRequest::new(&[], &[]).failing_on("add_assignees");
        let err = assign_author(&rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap_err();
        assert!(err.to_string().contains("add_assignees failed"));
    }

    #[test]
    fn test_execute_noop_touches_nothing() {
        let rules = default_test_rules();
        let trigger = make_trigger("dave", "carol");
        let pr = MemoryPullRequest::new(&[], &[]);
        let action = Action::NoOp {
            reason: "nothing to do".to_string(),
        };
        let outcome =
            execute(&action, &rules, &trigger, roles_for(&rules, &trigger), &pr).unwrap();
        assert_eq!(outcome, Outcome::new(Status::NoMatchingTrigger, "nothing to do"));
        assert!(pr.calls().is_empty());
    }
}
