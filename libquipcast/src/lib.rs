//! Quipcast - generate and publish one short post per run
//!
//! This library looks up the authenticated account, reads its recent posts,
//! asks a chat-completion backend for something new that does not repeat
//! them, and publishes the result.

pub mod config;
pub mod error;
pub(crate) mod http;
pub mod generation;
pub mod logging;
pub mod oauth;
pub mod pipeline;
pub mod platforms;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{QuipcastError, Result};
pub use generation::{Backend, ChatCompletionClient, Generator};
pub use pipeline::{Pipeline, RunReport, RunSettings, Stage};
pub use platforms::{twitter::TwitterClient, Platform};
pub use types::{GeneratedText, HistoryItem, Identity, PublishResult};
