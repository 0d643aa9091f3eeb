use tracing::info;

use crate::config::Rules;
use crate::error::Result;
use crate::event::{self, Normalized, RawEvent};
use crate::handle::{PullRequestHandle, Reaction};
use crate::matcher::select_action;
use crate::outcome::{Outcome, Status};
use crate::policy::RoleFacts;
use crate::reconcile;

/// Handle one event end to end: normalize, authorize, match, reconcile and
/// acknowledge. `open` binds a handle to the pull request the event names.
///
/// Decision-level rejections come back as `Ok(Outcome)`; only failures from
/// the handle are errors.
pub fn run<H, F>(rules: &Rules, event: RawEvent, open: F) -> Result<Outcome>
where
    H: PullRequestHandle,
    F: FnOnce(u64) -> H,
{
    let trigger = match event::normalize(event) {
        Normalized::Trigger(trigger) => trigger,
        Normalized::NotApplicable(reason) => {
            return Ok(Outcome::new(Status::NotApplicable, reason));
        }
    };
    info!(
        pull_request = trigger.pull_request,
        commenter = %trigger.commenter,
        author = %trigger.author,
        kind = ?trigger.kind,
        force_assign_author = trigger.force_assign_author,
        "event normalized"
    );

    let roles = RoleFacts::derive(&trigger, rules);
    let action = select_action(
        &trigger.body,
        trigger.force_assign_author,
        &rules.request_review_trigger,
        &rules.request_update_trigger,
    );
    info!(%action, ?roles, "action selected");

    let handle = open(trigger.pull_request);
    let outcome = reconcile::execute(&action, rules, &trigger, roles, &handle)?;

    if outcome.transitioned()
        && let Some(comment_id) = trigger.reaction_target()
    {
        handle.react_to_comment(comment_id, Reaction::PlusOne)?;
        info!(comment_id, "comment acknowledged");
    }

    Ok(outcome)
}
