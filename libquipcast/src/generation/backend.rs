//! Generation backends and identifier resolution

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Chat-completion providers a run can generate text with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    #[serde(rename = "groq")]
    Groq,
    #[serde(rename = "openai")]
    OpenAi,
}

impl Backend {
    /// Backend used when the configured identifier is empty or unknown
    pub const DEFAULT: Backend = Backend::Groq;

    pub const ALL: [Backend; 2] = [Backend::Groq, Backend::OpenAi];

    /// Identifier as accepted in configuration
    pub fn id(&self) -> &'static str {
        match self {
            Backend::Groq => "groq",
            Backend::OpenAi => "openai",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Backend::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Backend::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Backend::Groq => "llama-3.3-70b-versatile",
            Backend::OpenAi => "gpt-4o-mini",
        }
    }

    /// Strict lookup, case-insensitive and ignoring surrounding whitespace
    pub fn parse(id: &str) -> Option<Backend> {
        let id = id.trim();
        Backend::ALL
            .into_iter()
            .find(|backend| backend.id().eq_ignore_ascii_case(id))
    }

    /// Permissive lookup: anything unrecognized, including "", is the default
    pub fn resolve(id: &str) -> Backend {
        match Backend::parse(id) {
            Some(backend) => backend,
            None => {
                if !id.trim().is_empty() {
                    tracing::warn!(
                        requested = id,
                        fallback = Backend::DEFAULT.id(),
                        "Unknown generation backend, using default"
                    );
                }
                Backend::DEFAULT
            }
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::parse(s).ok_or_else(|| {
            let valid: Vec<&str> = Backend::ALL.iter().map(|b| b.id()).collect();
            format!(
                "Invalid backend: '{}'. Valid options: {}",
                s,
                valid.join(", ")
            )
        })
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
