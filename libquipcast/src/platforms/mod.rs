//! Platform abstraction and implementations
//!
//! A platform is where generated posts end up. The pipeline needs exactly
//! three things from it: who the caller is, what they posted recently, and a
//! way to publish one new post.
//!
//! # Examples
//!
//! ```no_run
//! use libquipcast::platforms::{Platform, mock::MockPlatform};
//! use libquipcast::types::GeneratedText;
//!
//! # async fn example() -> libquipcast::Result<()> {
//! let platform = MockPlatform::success("mock");
//!
//! let identity = platform.identify().await?;
//! let history = platform.fetch_recent(&identity, 10).await?;
//! println!("{} recent posts", history.len());
//!
//! let text = GeneratedText::normalize("Hello, world")?;
//! let result = platform.publish(&text).await?;
//! println!("{}", platform.permalink(&identity, &result.id));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GeneratedText, HistoryItem, Identity, PublishResult};

pub mod mock;
pub mod twitter;

/// Platform trait for the three operations a run performs
///
/// Every operation is single-shot: implementations must not retry, paginate
/// past the first page or back off.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Look up the account the credentials belong to
    ///
    /// # Errors
    ///
    /// Returns `QuipcastError::Auth` if the request cannot be built, the
    /// transport fails, or the platform does not answer with 200.
    async fn identify(&self) -> Result<Identity>;

    /// Fetch up to `count` of the account's most recent posts, newest first
    ///
    /// An account with no posts yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns `QuipcastError::Fetch` on the same conditions as `identify`.
    async fn fetch_recent(&self, identity: &Identity, count: usize) -> Result<Vec<HistoryItem>>;

    /// Publish one post
    ///
    /// # Errors
    ///
    /// Returns `QuipcastError::Publish` unless the platform answers 201 with a
    /// decodable `{id, text}` payload.
    async fn publish(&self, text: &GeneratedText) -> Result<PublishResult>;

    /// Human-readable URL of a published post
    fn permalink(&self, identity: &Identity, post_id: &str) -> String;

    /// Lowercase platform identifier (e.g., "twitter")
    fn name(&self) -> &str;
}
