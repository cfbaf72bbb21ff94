//! One publishing run: identify, fetch history, generate, publish
//!
//! Stages run strictly in order and each waits for the previous one:
//!
//! ```text
//! Start → Authenticated → HistoryFetched → Generated → Published → Done
//! ```
//!
//! Every stage failure aborts the run except history fetching, which degrades
//! to an empty history. Nothing is retried and nothing is rolled back.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::generation::{Backend, Generator};
use crate::platforms::Platform;
use crate::types::{HistoryItem, Identity, PublishResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Start,
    Authenticated,
    HistoryFetched,
    Generated,
    Published,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Authenticated => "authenticated",
            Stage::HistoryFetched => "history-fetched",
            Stage::Generated => "generated",
            Stage::Published => "published",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-run knobs taken from configuration
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Backend identifier, resolved permissively at generation time
    pub backend: String,
    /// How many recent posts to exclude; 0 skips the history fetch
    pub history_count: usize,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub identity: Identity,
    pub history_len: usize,
    /// History could not be fetched and generation ran without it
    pub history_degraded: bool,
    pub backend: Backend,
    pub post: PublishResult,
    pub permalink: String,
}

pub struct Pipeline {
    platform: Box<dyn Platform>,
    generator: Box<dyn Generator>,
    settings: RunSettings,
}

impl Pipeline {
    pub fn new(
        platform: Box<dyn Platform>,
        generator: Box<dyn Generator>,
        settings: RunSettings,
    ) -> Self {
        Self {
            platform,
            generator,
            settings,
        }
    }

    /// Execute one run
    ///
    /// # Errors
    ///
    /// Returns the error of the first fatal stage: `QuipcastError::Auth`,
    /// `QuipcastError::Generation` or `QuipcastError::Publish`. History fetch
    /// failures are logged and never returned.
    #[instrument(skip(self), fields(platform = self.platform.name()))]
    pub async fn run(&self) -> Result<RunReport> {
        let stage = Stage::Start;

        let identity = self.platform.identify().await?;
        let stage = advance(stage, Stage::Authenticated);
        info!("Authenticated as @{} ({})", identity.username, identity.name);

        let (history, history_degraded) = self.fetch_history(&identity).await;
        let stage = advance(stage, Stage::HistoryFetched);

        let backend = Backend::resolve(&self.settings.backend);
        info!(model = backend.model(), "Generating post with {}", backend);
        let text = self.generator.generate(backend, &history).await?;
        let stage = advance(stage, Stage::Generated);
        info!("Generated: {}", text);

        let post = self.platform.publish(&text).await?;
        let stage = advance(stage, Stage::Published);
        let permalink = self.platform.permalink(&identity, &post.id);
        info!(id = %post.id, url = %permalink, "Post published");

        advance(stage, Stage::Done);

        Ok(RunReport {
            identity,
            history_len: history.len(),
            history_degraded,
            backend,
            post,
            permalink,
        })
    }

    /// Best-effort: any failure yields an empty history
    async fn fetch_history(&self, identity: &Identity) -> (Vec<HistoryItem>, bool) {
        if self.settings.history_count == 0 {
            debug!("History disabled, generating without context");
            return (Vec::new(), false);
        }

        match self
            .platform
            .fetch_recent(identity, self.settings.history_count)
            .await
        {
            Ok(history) => {
                info!("Found {} recent posts to avoid repeating", history.len());
                (history, false)
            }
            Err(e) => {
                warn!("Could not fetch recent posts: {}. Generating without history.", e);
                (Vec::new(), true)
            }
        }
    }
}

fn advance(from: Stage, to: Stage) -> Stage {
    debug_assert!(to > from, "stage {} cannot follow {}", to, from);
    debug!(from = %from, to = %to, "Stage transition");
    to
}
