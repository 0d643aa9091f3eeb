use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reviewflow::bot;
use reviewflow::cli::Cli;
use reviewflow::config::Settings;
use reviewflow::error::Result;
use reviewflow::event::load_event;
use reviewflow::github::GitHubClient;
use reviewflow::handle::DryRun;
use reviewflow::outcome::Outcome;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .init();
}

fn run(settings: Settings) -> Result<Outcome> {
    let event = load_event(&settings.event_path, settings.event_name.as_deref())?;
    let client = GitHubClient::new(settings.api_url, &settings.repository, settings.token)?;

    if settings.dry_run {
        info!("dry run: changes will be logged, not sent");
        bot::run(&settings.rules, event, |number| {
            DryRun::new(client.pull_request(number))
        })
    } else {
        bot::run(&settings.rules, event, |number| client.pull_request(number))
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let settings = match Settings::load(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    info!(?settings, "settings loaded");

    match run(settings) {
        Ok(outcome) => outcome.report(),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
