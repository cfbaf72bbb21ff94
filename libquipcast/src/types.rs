//! Core types for Quipcast

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// The authenticated account a run posts as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    /// Display name
    pub name: String,
    /// Handle without the leading `@`
    pub username: String,
}

/// One previously published post, used as deduplication context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub text: String,
}

/// Confirmation returned by the platform after a successful publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Text produced by a generation backend, normalized and known to be non-empty
///
/// The only way to obtain a value is [`GeneratedText::normalize`], so anything
/// handed to [`crate::platforms::Platform::publish`] has already been trimmed
/// and unquoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GeneratedText(String);

/// Enclosing quote pairs models like to wrap their answer in
const QUOTE_PAIRS: [(char, char); 3] = [('"', '"'), ('\'', '\''), ('\u{201C}', '\u{201D}')];

impl GeneratedText {
    /// Trim surrounding whitespace, then strip one layer of enclosing quotes
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::EmptyText` if nothing but whitespace is left.
    pub fn normalize(raw: &str) -> std::result::Result<Self, GenerationError> {
        let text = strip_enclosing_quotes(raw.trim());

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyText);
        }

        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GeneratedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn strip_enclosing_quotes(text: &str) -> &str {
    for (open, close) in QUOTE_PAIRS {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    text
}
