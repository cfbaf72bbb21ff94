//! quip-post - Generate a fresh post and publish it

use std::future::Future;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use libquipcast::logging::{LogFormat, LoggingConfig};
use libquipcast::{
    ChatCompletionClient, Config, Pipeline, QuipcastError, Result, RunReport, RunSettings,
    TwitterClient,
};

#[derive(Parser, Debug)]
#[command(name = "quip-post")]
#[command(version)]
#[command(about = "Generate a post that doesn't repeat your recent ones and publish it")]
#[command(long_about = "\
quip-post - Generate a post that doesn't repeat your recent ones and publish it

DESCRIPTION:
    Each run looks up the authenticated X account, fetches its most recent
    posts, asks a chat-completion backend for a new post that differs from
    them, and publishes it. Designed to be run from cron or a CI schedule.

ENVIRONMENT:
    TWITTER_CONSUMER_KEY, TWITTER_CONSUMER_SECRET,
    TWITTER_ACCESS_TOKEN, TWITTER_ACCESS_SECRET   Platform credentials
    AI_API_KEY                                   Generation API key
    AI_PROVIDER                                  groq (default) or openai
    OPENAI_API_KEY                               Legacy key, implies openai
    QUIPCAST_CONFIG                              Settings file path

EXIT CODES:
    0   - Post published
    1   - Generation or publishing failed
    2   - Authentication failed
    3   - Configuration error or invalid arguments
    130 - Interrupted
")]
struct Cli {
    /// Settings file (overrides QUIPCAST_CONFIG)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of recent posts to avoid repeating (0 disables history)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(0..=100))]
    history_count: Option<u64>,

    /// Output format for the confirmation (text or json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Log format (text, json or pretty)
    #[arg(long, env = "QUIPCAST_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Exit status for rejected arguments, shared with configuration errors
const USAGE_EXIT_CODE: i32 = 3;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(USAGE_EXIT_CODE);
            }
        },
    };

    let mut logging = LoggingConfig::from_lookup(|key| std::env::var(key).ok());
    logging.format = cli.log_format;
    logging.verbose = cli.verbose;
    logging.init();

    let format = cli.format;
    let outcome = tokio::select! {
        result = run(cli) => result,
        _ = wait_for_interrupt(tokio::signal::ctrl_c()) => {
            Err(QuipcastError::Cancelled("interrupted before the run completed".to_string()))
        }
    };

    match outcome {
        Ok(report) => println!("{}", render(&report, format)),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Resolves once `signal` reports an interrupt; never resolves if listening failed
async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!("Could not listen for Ctrl-C, the run cannot be interrupted: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let mut config = Config::from_env(cli.config.as_deref())?;
    if let Some(count) = cli.history_count {
        config.history_count = count as usize;
    }
    tracing::debug!(
        backend = %config.generation.backend,
        history_count = config.history_count,
        timeout_secs = config.http.timeout.as_secs(),
        "Configuration loaded"
    );

    let settings = RunSettings {
        backend: config.generation.backend.clone(),
        history_count: config.history_count,
    };

    let platform = TwitterClient::new(config.twitter, &config.http)?;
    let generator = ChatCompletionClient::new(config.generation, &config.http)?;

    Pipeline::new(Box::new(platform), Box::new(generator), settings)
        .run()
        .await
}

fn render(report: &RunReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "Published {} {} {}",
            report.post.id, report.permalink, report.post.text
        ),
        OutputFormat::Json => serde_json::json!({
            "id": report.post.id,
            "url": report.permalink,
            "text": report.post.text,
            "handle": report.identity.username,
            "backend": report.backend,
            "history": report.history_len,
            "history_degraded": report.history_degraded,
        })
        .to_string(),
    }
}
