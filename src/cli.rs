use clap::Parser;

/// reviewflow: move pull requests between awaiting-review and awaiting-update
///
/// Every option falls back to the environment a GitHub Actions runner
/// provides (GITHUB_* and INPUT_* variables), then to the config file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "reviewflow", version, about)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<String>,

    /// Repository as owner/name (default: $GITHUB_REPOSITORY)
    #[arg(long)]
    pub repository: Option<String>,

    /// Path to the event payload (default: $GITHUB_EVENT_PATH)
    #[arg(long)]
    pub event_path: Option<String>,

    /// Event name, issue_comment or pull_request_review (default: $GITHUB_EVENT_NAME)
    #[arg(long)]
    pub event_name: Option<String>,

    /// Comma-separated reviewer logins
    #[arg(long)]
    pub reviewers: Option<String>,

    /// Phrase that hands the pull request to the reviewers
    #[arg(long)]
    pub request_review_trigger: Option<String>,

    /// Phrase that hands the pull request back to its author
    #[arg(long)]
    pub request_update_trigger: Option<String>,

    /// Label marking a pull request that waits on its author
    #[arg(long)]
    pub awaiting_update_label: Option<String>,

    /// Label marking a pull request that waits on reviewers
    #[arg(long)]
    pub awaiting_review_label: Option<String>,

    /// GitHub API base URL (default: $GITHUB_API_URL or https://api.github.com)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Decide and log the changes without sending them
    #[arg(long)]
    pub dry_run: bool,
}
