use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::cli::Cli;
use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
const ENV_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
const ENV_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
const ENV_API_URL: &str = "GITHUB_API_URL";
const ENV_TOKEN: &str = "INPUT_TOKEN";
const ENV_FALLBACK_TOKEN: &str = "GITHUB_TOKEN";
const ENV_REVIEWERS: &str = "INPUT_REVIEWERS";
const ENV_REQUEST_REVIEW_TRIGGER: &str = "INPUT_REQUEST_REVIEW_TRIGGER";
const ENV_REQUEST_UPDATE_TRIGGER: &str = "INPUT_REQUEST_UPDATE_TRIGGER";
const ENV_AWAITING_UPDATE_LABEL: &str = "INPUT_AWAITING_UPDATE_LABEL";
const ENV_AWAITING_REVIEW_LABEL: &str = "INPUT_AWAITING_REVIEW_LABEL";
const ENV_DRY_RUN: &str = "INPUT_DRY_RUN";

/// Optional TOML file. The token is never read from it.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub reviewers: Option<Vec<String>>,
    pub request_review_trigger: Option<String>,
    pub request_update_trigger: Option<String>,
    pub awaiting_update_label: Option<String>,
    pub awaiting_review_label: Option<String>,
    pub api_url: Option<String>,
    pub dry_run: Option<bool>,
}

/// The part of the settings the decision logic depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    pub reviewers: Vec<String>,
    pub request_review_trigger: String,
    pub request_update_trigger: String,
    pub awaiting_update_label: String,
    pub awaiting_review_label: String,
}

impl Rules {
    pub fn is_reviewer(&self, login: &str) -> bool {
        self.reviewers.iter().any(|r| r == login)
    }

    /// Reviewers quoted and comma-joined, in configured order.
    pub fn show_reviewers(&self) -> String {
        self.reviewers
            .iter()
            .map(|r| format!("\"{r}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug)]
pub struct Settings {
    pub repository: String,
    pub event_path: PathBuf,
    pub event_name: Option<String>,
    pub token: SecretString,
    pub api_url: Url,
    pub dry_run: bool,
    pub rules: Rules,
}

impl Settings {
    /// Resolve settings from CLI flags, the process environment and the
    /// optional config file, in that order of precedence.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => read_config_file(Path::new(path))?,
            None => ConfigFile::default(),
        };
        resolve(cli, file, |key| std::env::var(key).ok())
    }
}

pub fn read_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Err(Error::ConfigNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Merge the three sources. `env` looks up a variable by name.
pub fn resolve<E>(cli: &Cli, file: ConfigFile, env: E) -> Result<Settings>
where
    E: Fn(&str) -> Option<String>,
{
    let present = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let repository = required(
        "repository",
        "--repository or GITHUB_REPOSITORY",
        cli.repository.clone().or_else(|| present(ENV_REPOSITORY)),
    )?;
    validate_repository(&repository)?;

    let event_path = required(
        "event path",
        "--event-path or GITHUB_EVENT_PATH",
        cli.event_path.clone().or_else(|| present(ENV_EVENT_PATH)),
    )?;
    let event_name = cli.event_name.clone().or_else(|| present(ENV_EVENT_NAME));

    let token = required(
        "token",
        "INPUT_TOKEN or GITHUB_TOKEN",
        present(ENV_TOKEN).or_else(|| present(ENV_FALLBACK_TOKEN)),
    )?;

    // An explicitly empty list from the CLI or the file means "no reviewers";
    // a blank variable is an unset Actions input and falls through.
    let reviewers = if let Some(raw) = cli.reviewers.as_deref() {
        parse_reviewers(raw)
    } else if let Some(raw) = present(ENV_REVIEWERS) {
        parse_reviewers(&raw)
    } else if let Some(list) = &file.reviewers {
        normalize_reviewers(list.iter().map(String::as_str))
    } else {
        return Err(missing("reviewers", &hint("reviewers", ENV_REVIEWERS)));
    };

    let request_review_trigger = phrase(
        "request_review_trigger",
        ENV_REQUEST_REVIEW_TRIGGER,
        cli.request_review_trigger
            .clone()
            .or_else(|| present(ENV_REQUEST_REVIEW_TRIGGER))
            .or(file.request_review_trigger),
    )?;
    let request_update_trigger = phrase(
        "request_update_trigger",
        ENV_REQUEST_UPDATE_TRIGGER,
        cli.request_update_trigger
            .clone()
            .or_else(|| present(ENV_REQUEST_UPDATE_TRIGGER))
            .or(file.request_update_trigger),
    )?;
    let awaiting_update_label = phrase(
        "awaiting_update_label",
        ENV_AWAITING_UPDATE_LABEL,
        cli.awaiting_update_label
            .clone()
            .or_else(|| present(ENV_AWAITING_UPDATE_LABEL))
            .or(file.awaiting_update_label),
    )?;
    let awaiting_review_label = phrase(
        "awaiting_review_label",
        ENV_AWAITING_REVIEW_LABEL,
        cli.awaiting_review_label
            .clone()
            .or_else(|| present(ENV_AWAITING_REVIEW_LABEL))
            .or(file.awaiting_review_label),
    )?;
    if awaiting_update_label == awaiting_review_label {
        return Err(Error::ConfigValidation(format!(
            "awaiting_update_label and awaiting_review_label must differ (both are \"{awaiting_update_label}\")"
        )));
    }

    let api_url = parse_api_url(
        &cli.api_url
            .clone()
            .or_else(|| present(ENV_API_URL))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
    )?;

    let dry_run = cli.dry_run
        || match present(ENV_DRY_RUN) {
            Some(raw) => parse_bool(ENV_DRY_RUN, &raw)?,
            None => file.dry_run.unwrap_or(false),
        };

    Ok(Settings {
        repository,
        event_path: PathBuf::from(event_path),
        event_name,
        token: SecretString::from(token),
        api_url,
        dry_run,
        rules: Rules {
            reviewers,
            request_review_trigger,
            request_update_trigger,
            awaiting_update_label,
            awaiting_review_label,
        },
    })
}

/// Split a comma-separated login list.
pub fn parse_reviewers(raw: &str) -> Vec<String> {
    normalize_reviewers(raw.split(','))
}

/// Trim, drop empty entries and repeated logins, keeping first-seen order.
fn normalize_reviewers<'a>(logins: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut reviewers: Vec<String> = Vec::new();
    for login in logins.into_iter().map(str::trim) {
        if !login.is_empty() && !reviewers.iter().any(|r| r == login) {
            reviewers.push(login.to_string());
        }
    }
    reviewers
}

fn hint(key: &str, env_key: &str) -> String {
    format!(
        "--{}, {env_key} or `{key}` in the config file",
        key.replace('_', "-")
    )
}

fn missing(name: &str, hint: &str) -> Error {
    Error::ConfigValidation(format!("missing required setting: {name} (set {hint})"))
}

fn required(name: &str, hint: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| missing(name, hint))
}

/// Trigger phrases and label names are compared lower-cased.
fn phrase(key: &str, env_key: &str, value: Option<String>) -> Result<String> {
    let value = required(key, &hint(key, env_key), value)?;
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return Err(Error::ConfigValidation(format!("{key} must not be empty")));
    }
    Ok(value)
}

fn validate_repository(repository: &str) -> Result<()> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(Error::ConfigValidation(format!(
            "repository must be owner/name, got \"{repository}\""
        ))),
    }
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::ConfigValidation(format!("invalid api_url \"{raw}\": {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::ConfigValidation(format!(
            "invalid api_url \"{raw}\": not a base URL"
        )));
    }
    Ok(url)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(Error::ConfigValidation(format!(
            "{key} must be a boolean, got \"{other}\""
        ))),
    }
}
