//! Configuration management for Quipcast
//!
//! Configuration is assembled once at process start from two layers:
//!
//! - an optional TOML settings file for non-secret knobs (API base URLs,
//!   history size, output length, timeouts)
//! - environment variables for credentials and the generation backend
//!
//! The result is a plain [`Config`] value handed to the clients and the
//! pipeline; nothing below this module reads the environment.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::generation::DEFAULT_MAX_TOKENS;
use crate::oauth::OAuthCredentials;
use crate::platforms::twitter::{DEFAULT_API_BASE, DEFAULT_WEB_BASE};

pub const DEFAULT_HISTORY_COUNT: usize = 10;
pub const MAX_HISTORY_COUNT: usize = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable names
pub mod vars {
    pub const CONSUMER_KEY: &str = "TWITTER_CONSUMER_KEY";
    pub const CONSUMER_SECRET: &str = "TWITTER_CONSUMER_SECRET";
    pub const ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
    pub const ACCESS_SECRET: &str = "TWITTER_ACCESS_SECRET";
    pub const AI_API_KEY: &str = "AI_API_KEY";
    pub const AI_PROVIDER: &str = "AI_PROVIDER";
    /// Older single-provider key; implies the `openai` backend
    pub const LEGACY_OPENAI_KEY: &str = "OPENAI_API_KEY";
    pub const CONFIG_PATH: &str = "QUIPCAST_CONFIG";
}

/// Backend the legacy key has always belonged to
const LEGACY_BACKEND: &str = "openai";

// ============================================================================
// Settings file
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub platform: PlatformSettings,
    pub generation: GenerationSettings,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub api_base: String,
    pub web_base: String,
    pub history_count: usize,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            web_base: DEFAULT_WEB_BASE.to_string(),
            history_count: DEFAULT_HISTORY_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Backend identifier; `AI_PROVIDER` takes precedence
    pub backend: Option<String>,
    pub max_tokens: u32,
    /// Replaces the backend's endpoint URL, keeping its model
    pub endpoint: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            backend: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl Settings {
    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let settings: Settings = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(settings)
    }

    /// Load settings from the default location, or defaults if there is no file
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// `<config_dir>/quipcast/config.toml` per the XDG Base Directory layout
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quipcast").join("config.toml"))
}

// ============================================================================
// Assembled configuration
// ============================================================================

#[derive(Debug)]
pub struct Config {
    pub twitter: TwitterConfig,
    pub generation: GenerationConfig,
    pub http: HttpConfig,
    /// Number of recent posts used as deduplication context
    pub history_count: usize,
}

#[derive(Debug)]
pub struct TwitterConfig {
    pub credentials: OAuthCredentials,
    pub api_base: String,
    pub web_base: String,
}

#[derive(Debug)]
pub struct GenerationConfig {
    pub api_key: SecretString,
    /// Raw backend identifier, resolved permissively when the run generates
    pub backend: String,
    pub endpoint: Option<String>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("quipcast/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Assemble configuration from the process environment
    ///
    /// `config_path` (e.g. from a CLI flag) wins over `QUIPCAST_CONFIG`; an
    /// explicitly named file must exist, the default location is optional.
    pub fn from_env(config_path: Option<&Path>) -> Result<Self> {
        Self::assemble(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable lookup
    pub fn assemble<F>(config_path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = config_path.map(Path::to_path_buf).or_else(|| {
            non_empty(&lookup, vars::CONFIG_PATH)
                .map(|p| PathBuf::from(shellexpand::tilde(&p).to_string()))
        });

        let settings = match explicit {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Settings::load_from_path(&path)?
            }
            None => Settings::load_default()?,
        };

        Self::from_lookup(settings, lookup)
    }

    /// Combine settings with credentials looked up through `lookup`
    ///
    /// Empty variables count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` naming every missing platform
    /// credential, or the generation key, and `ConfigError::InvalidValue` for
    /// out-of-range settings.
    pub fn from_lookup<F>(settings: Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = [
            vars::CONSUMER_KEY,
            vars::CONSUMER_SECRET,
            vars::ACCESS_TOKEN,
            vars::ACCESS_SECRET,
        ];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| non_empty(&lookup, key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingField(missing.join(", ")).into());
        }

        let credential = |key: &str| non_empty(&lookup, key).unwrap_or_default();
        let credentials = OAuthCredentials {
            consumer_key: credential(vars::CONSUMER_KEY),
            consumer_secret: credential(vars::CONSUMER_SECRET).into(),
            token: credential(vars::ACCESS_TOKEN),
            token_secret: credential(vars::ACCESS_SECRET).into(),
        };

        let (api_key, backend) = match non_empty(&lookup, vars::AI_API_KEY) {
            Some(key) => {
                let backend = non_empty(&lookup, vars::AI_PROVIDER)
                    .or(settings.generation.backend.clone())
                    .unwrap_or_default();
                (key, backend)
            }
            None => match non_empty(&lookup, vars::LEGACY_OPENAI_KEY) {
                Some(key) => {
                    tracing::debug!(
                        "{} is unset, using {} with the {} backend",
                        vars::AI_API_KEY,
                        vars::LEGACY_OPENAI_KEY,
                        LEGACY_BACKEND
                    );
                    (key, LEGACY_BACKEND.to_string())
                }
                None => {
                    return Err(ConfigError::MissingField(vars::AI_API_KEY.to_string()).into())
                }
            },
        };

        validate(&settings)?;

        Ok(Self {
            twitter: TwitterConfig {
                credentials,
                api_base: settings.platform.api_base,
                web_base: settings.platform.web_base,
            },
            generation: GenerationConfig {
                api_key: api_key.into(),
                backend,
                endpoint: settings.generation.endpoint,
                max_tokens: settings.generation.max_tokens,
            },
            http: HttpConfig {
                timeout: Duration::from_secs(settings.http.timeout_secs),
                user_agent: settings.http.user_agent.unwrap_or_else(default_user_agent),
            },
            history_count: settings.platform.history_count,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.is_empty())
}

fn validate(settings: &Settings) -> Result<()> {
    let invalid = |field: &str, reason: String| ConfigError::InvalidValue {
        field: field.to_string(),
        reason,
    };

    if settings.platform.history_count > MAX_HISTORY_COUNT {
        return Err(invalid(
            "platform.history_count",
            format!("must be at most {}", MAX_HISTORY_COUNT),
        )
        .into());
    }
    if settings.generation.max_tokens == 0 {
        return Err(invalid("generation.max_tokens", "must be positive".to_string()).into());
    }
    if settings.http.timeout_secs == 0 {
        return Err(invalid("http.timeout_secs", "must be positive".to_string()).into());
    }
    Ok(())
}
