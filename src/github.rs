use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::handle::{PullRequestHandle, Reaction};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("reviewflow/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const PER_PAGE: usize = 100;
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

/// Blocking GitHub REST client scoped to one repository.
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: Url,
    owner: String,
    name: String,
    token: SecretString,
    initial_backoff_ms: u64,
}

impl GitHubClient {
    pub fn new(api_url: Url, repository: &str, token: SecretString) -> Result<Self> {
        let (owner, name) = repository
            .split_once('/')
            .ok_or_else(|| Error::GitHub(format!("repository must be owner/name: {repository}")))?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build();
        Ok(Self {
            agent,
            api_url,
            owner: owner.to_string(),
            name: name.to_string(),
            token,
            initial_backoff_ms: INITIAL_BACKOFF_MS,
        })
    }

    #[cfg(test)]
    fn with_backoff(mut self, initial_backoff_ms: u64) -> Self {
        self.initial_backoff_ms = initial_backoff_ms;
        self
    }

    pub fn pull_request(&self, number: u64) -> GitHubPullRequest<'_> {
        GitHubPullRequest {
            client: self,
            number,
        }
    }

    /// `{api}/repos/{owner}/{name}/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::GitHub(format!("api url cannot be a base: {}", self.api_url)))?
            .pop_if_empty()
            .push("repos")
            .push(&self.owner)
            .push(&self.name)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        self.agent
            .request_url(method, url)
            .set(
                "Authorization",
                &format!("Bearer {}", self.token.expose_secret()),
            )
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION)
    }

    /// Send with retry on rate limits, server errors and transport failures.
    fn send(
        &self,
        method: &str,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> std::result::Result<ureq::Response, ureq::Error> {
        let mut backoff_ms = self.initial_backoff_ms;
        let mut attempt = 1;
        loop {
            let request = self.request(method, url);
            let result = match body {
                Some(body) => request.send_json(body),
                None => request.call(),
            };
            match result {
                Err(ref e) if attempt < MAX_RETRIES && is_retryable(e) => {
                    warn!(
                        attempt,
                        error = %e,
                        backoff_ms,
                        "retrying GitHub API after transient error"
                    );
                    thread::sleep(Duration::from_millis(backoff_ms));
                    backoff_ms *= 2;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn send_ok(
        &self,
        what: &str,
        method: &str,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<ureq::Response> {
        self.send(method, url, body)
            .map_err(|e| api_error(what, method, url, e))
    }
}

/// Only retry rate-limits (429), server errors (5xx), and transport/network errors.
fn is_retryable(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::Status(code, _) => *code == 429 || *code >= 500,
        ureq::Error::Transport(_) => true,
    }
}

fn api_error(what: &str, method: &str, url: &Url, err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            Error::GitHub(format!(
                "{what} failed: {method} {} returned {code}: {}",
                url.path(),
                body.trim()
            ))
        }
        ureq::Error::Transport(transport) => Error::GitHub(format!(
            "{what} failed: {method} {}: {transport}",
            url.path()
        )),
    }
}

/// One pull request, addressed through the issues API it shares with issues.
pub struct GitHubPullRequest<'a> {
    client: &'a GitHubClient,
    number: u64,
}

impl GitHubPullRequest<'_> {
    fn issue_endpoint(&self, rest: &[&str]) -> Result<Url> {
        let number = self.number.to_string();
        let mut segments = vec!["issues", number.as_str()];
        segments.extend_from_slice(rest);
        self.client.endpoint(&segments)
    }
}

impl PullRequestHandle for GitHubPullRequest<'_> {
    fn list_labels(&self) -> Result<BTreeSet<String>> {
        let mut labels = BTreeSet::new();
        let mut page = 1;
        loop {
            let mut url = self.issue_endpoint(&["labels"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            let response = self.client.send_ok("list labels", "GET", &url, None)?;
            let batch: Vec<GhLabel> = response
                .into_json()
                .map_err(|e| Error::GitHub(format!("failed to parse labels: {e}")))?;
            let count = batch.len();
            labels.extend(batch.into_iter().map(|l| l.name));
            if count < PER_PAGE {
                break;
            }
            page += 1;
        }
        debug!(pull_request = self.number, ?labels, "fetched labels");
        Ok(labels)
    }

    fn add_label(&self, name: &str) -> Result<()> {
        let url = self.issue_endpoint(&["labels"])?;
        let body = serde_json::json!({ "labels": [name] });
        self.client.send_ok("add label", "POST", &url, Some(&body))?;
        Ok(())
    }

    fn remove_label(&self, name: &str) -> Result<()> {
        let url = self.issue_endpoint(&["labels", name])?;
        match self.client.send("DELETE", &url, None) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(404, _)) => {
                debug!(label = name, "label already removed");
                Ok(())
            }
            Err(e) => Err(api_error("remove label", "DELETE", &url, e)),
        }
    }

    fn add_assignees(&self, logins: &[String]) -> Result<()> {
        if logins.is_empty() {
            return Ok(());
        }
        let url = self.issue_endpoint(&["assignees"])?;
        let body = serde_json::json!({ "assignees": logins });
        self.client.send_ok("add assignees", "POST", &url, Some(&body))?;
        Ok(())
    }

    fn remove_assignees(&self, logins: &[String]) -> Result<()> {
        if logins.is_empty() {
            return Ok(());
        }
        let url = self.issue_endpoint(&["assignees"])?;
        let body = serde_json::json!({ "assignees": logins });
        self.client
            .send_ok("remove assignees", "DELETE", &url, Some(&body))?;
        Ok(())
    }

    fn react_to_comment(&self, comment_id: u64, reaction: Reaction) -> Result<()> {
        let id = comment_id.to_string();
        let url = self
            .client
            .endpoint(&["issues", "comments", id.as_str(), "reactions"])?;
        let body = serde_json::json!({ "content": reaction.as_str() });
        self.client.send_ok("react to comment", "POST", &url, Some(&body))?;
        Ok(())
    }
}
