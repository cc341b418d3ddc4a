use std::path::PathBuf;

use clap::Parser;
use github_notifier::{
    Credentials, GitHubEventSource, LogNotifier, NotificationSink, PollConfig, PollLoop,
    TerminalNotifier,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub username whose received events are watched
    #[arg(short, long, env = "GITHUB_USERNAME")]
    username: String,

    /// GitHub password or personal access token
    #[arg(short, long, env = "GITHUB_PASSWORD", hide_env_values = true)]
    password: String,

    /// Path to the terminal-notifier binary
    #[arg(long, default_value = "terminal-notifier")]
    notifier_path: PathBuf,

    /// Log notifications instead of showing them on the desktop
    #[arg(long)]
    log_only: bool,
}

async fn run<N: NotificationSink>(
    source: GitHubEventSource,
    sink: N,
    credentials: Credentials,
) {
    PollLoop::new(source, sink, credentials, PollConfig::default())
        .run()
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let credentials = Credentials {
        username: args.username,
        password: args.password,
    };
    let source = GitHubEventSource::new()?;

    if args.log_only || !cfg!(target_os = "macos") {
        if !args.log_only {
            warn!("Desktop notifications are only supported on macOS - logging instead");
        }
        run(source, LogNotifier, credentials).await;
    } else {
        info!("Showing notifications with {}", args.notifier_path.display());
        run(source, TerminalNotifier::new(args.notifier_path), credentials).await;
    }

    Ok(())
}
