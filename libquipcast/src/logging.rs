//! Logging setup for the quip-post binary
//!
//! Logs always go to stderr so stdout carries nothing but the confirmation
//! line. Three formats are available:
//!
//! - `text`: plain lines, no target, suitable for cron mail and CI logs
//! - `json`: one JSON object per line for log shippers
//! - `pretty`: multi-line colored output for local development
//!
//! # Examples
//!
//! ```no_run
//! use libquipcast::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//!
//! // Or respect QUIPCAST_LOG_FORMAT / QUIPCAST_LOG_LEVEL
//! LoggingConfig::from_lookup(|key| std::env::var(key).ok()).init();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_VAR: &str = "QUIPCAST_LOG_FORMAT";
pub const LOG_LEVEL_VAR: &str = "QUIPCAST_LOG_LEVEL";

/// Shape of the lines written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One plain line per event
    #[default]
    Text,
    /// One JSON object per event
    Json,
    /// Multi-line, colored, with source locations
    Pretty,
}

impl LogFormat {
    pub const ALL: [LogFormat; 3] = [LogFormat::Text, LogFormat::Json, LogFormat::Pretty];

    /// Identifier accepted by `--log-format` and `QUIPCAST_LOG_FORMAT`
    pub fn id(self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "unknown log format '{}' (expected text, json or pretty)",
                    s
                )
            })
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    /// * `level` - default filter directive when `RUST_LOG` is unset
    /// * `verbose` - forces `debug` regardless of `level`
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read format and level through `lookup`, falling back to text/info
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = lookup(LOG_FORMAT_VAR)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let level = lookup(LOG_LEVEL_VAR)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "info".to_string());
        Self::new(format, level, false)
    }

    /// Filter directive in effect when `RUST_LOG` is unset
    pub fn default_directive(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.level
        }
    }

    /// Install the global subscriber
    ///
    /// A second call is a no-op, which keeps tests that initialize logging
    /// from tripping over each other.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()));

        let result = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .try_init(),
        };

        if let Err(e) = result {
            tracing::debug!("Logging already initialized: {}", e);
        }
    }
}
