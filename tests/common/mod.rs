#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;

pub const REVIEW_TRIGGER: &str = "please review";
pub const UPDATE_TRIGGER: &str = "please update";
pub const UPDATE_LABEL: &str = "awaiting-update";
pub const REVIEW_LABEL: &str = "awaiting-review";

pub fn comment_event(body: &str, commenter: &str, author: &str, on_pr: bool) -> serde_json::Value {
    let mut issue = serde_json::json!({
        "number": 12,
        "user": {"login": author},
    });
    if on_pr {
        issue["pull_request"] = serde_json::json!({
            "url": "https://api.github.com/repos/octo/repo/pulls/12"
        });
    }
    serde_json::json!({
        "action": "created",
        "comment": {"id": 991, "body": body, "user": {"login": commenter}},
        "issue": issue,
    })
}

pub fn review_event(body: &str, reviewer: &str, author: &str, state: &str) -> serde_json::Value {
    serde_json::json!({
        "action": "submitted",
        "review": {"id": 3, "body": body, "user": {"login": reviewer}, "state": state},
        "pull_request": {"number": 12, "user": {"login": author}},
    })
}

/// Write an event payload into `dir` and return its path.
pub fn write_event(dir: &tempfile::TempDir, event: &serde_json::Value) -> PathBuf {
    let path = dir.path().join("event.json");
    std::fs::write(&path, event.to_string()).unwrap();
    path
}

/// The binary with a clean environment shaped like a GitHub Actions runner.
#[allow(deprecated)]
pub fn action_cmd(event_path: &PathBuf, api_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("reviewflow").unwrap();
    cmd.env_clear()
        .env("GITHUB_REPOSITORY", "octo/repo")
        .env("GITHUB_EVENT_PATH", event_path)
        .env("GITHUB_API_URL", api_url)
        .env("INPUT_TOKEN", "t0ken")
        .env("INPUT_REVIEWERS", "alice, bob")
        .env("INPUT_REQUEST_REVIEW_TRIGGER", REVIEW_TRIGGER)
        .env("INPUT_REQUEST_UPDATE_TRIGGER", UPDATE_TRIGGER)
        .env("INPUT_AWAITING_UPDATE_LABEL", UPDATE_LABEL)
        .env("INPUT_AWAITING_REVIEW_LABEL", REVIEW_LABEL)
        .env("NO_COLOR", "1");
    cmd
}
