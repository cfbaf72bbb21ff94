//! Text generation over interchangeable chat-completion backends
//!
//! A [`Backend`] names a provider (endpoint + model). A [`Generator`] turns a
//! backend and the account's recent history into one [`GeneratedText`].
//!
//! # Example
//!
//! ```no_run
//! use libquipcast::generation::{Backend, ChatCompletionClient, Generator};
//! use libquipcast::config::{GenerationConfig, HttpConfig};
//!
//! # async fn example() -> libquipcast::Result<()> {
//! let config = GenerationConfig {
//!     api_key: "gsk_example".to_string().into(),
//!     backend: "groq".to_string(),
//!     endpoint: None,
//!     max_tokens: 100,
//! };
//! let client = ChatCompletionClient::new(config, &HttpConfig::default())?;
//!
//! let text = client.generate(Backend::resolve("groq"), &[]).await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatMessage, GeneratedText, HistoryItem};

pub mod backend;
pub mod client;
pub mod prompt;

pub use backend::Backend;
pub use client::ChatCompletionClient;

/// Output length hint sent as `max_tokens` unless configured otherwise
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// One chat-completion call, built fresh for every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub backend: Backend,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Fixed system instruction plus a user instruction excluding `history`
    pub fn new(backend: Backend, history: &[HistoryItem], max_tokens: u32) -> Self {
        Self {
            backend,
            messages: prompt::build_messages(history),
            max_tokens,
        }
    }
}

/// Produces one post per call
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a post that differs from `history`
    ///
    /// Exactly one backend call is made; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns `QuipcastError::Generation` if the request fails, the backend
    /// answers with anything but 200, the response has no choices, or the
    /// text is empty after normalization.
    async fn generate(&self, backend: Backend, history: &[HistoryItem]) -> Result<GeneratedText>;
}
