//! X (Twitter) API v2 platform implementation

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::{HttpConfig, TwitterConfig};
use crate::error::{ConfigError, QuipcastError, RequestError, Result};
use crate::http::execute;
use crate::oauth::SignedClient;
use crate::platforms::Platform;
use crate::types::{GeneratedText, HistoryItem, Identity, PublishResult};

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_WEB_BASE: &str = "https://twitter.com";

/// Page size bounds accepted by `GET /2/users/{id}/tweets`
const MIN_PAGE_SIZE: usize = 5;
const MAX_PAGE_SIZE: usize = 100;

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    name: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
}

/// `data` is omitted entirely when the user has no posts
#[derive(Debug, Deserialize)]
struct UserTweetsResponse {
    #[serde(default)]
    data: Vec<TweetData>,
}

#[derive(Debug, Serialize)]
struct CreateTweetRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: TweetData,
}

pub struct TwitterClient {
    transport: SignedClient,
    api_base: Url,
    web_base: String,
}

impl TwitterClient {
    /// Create a client from platform configuration
    ///
    /// # Errors
    ///
    /// Returns `QuipcastError::Config` if the API base is not a valid URL, and
    /// `QuipcastError::Auth` if the HTTP client cannot be built.
    pub fn new(config: TwitterConfig, http: &HttpConfig) -> Result<Self> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            ConfigError::InvalidValue {
                field: "platform.api_base".to_string(),
                reason: e.to_string(),
            }
        })?;

        let transport = SignedClient::new(config.credentials, http.timeout, &http.user_agent)
            .map_err(QuipcastError::Auth)?;

        Ok(Self {
            transport,
            api_base,
            web_base: config.web_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str], operation: &'static str) -> std::result::Result<Url, RequestError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| RequestError::Build {
                operation,
                message: format!("API base {} cannot carry a path", self.api_base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_user(&self) -> std::result::Result<Identity, RequestError> {
        const OPERATION: &str = "identify";

        let url = self.endpoint(&["2", "users", "me"], OPERATION)?;
        let reply = execute(self.transport.get(url)?, OPERATION)
            .await?
            .expect_status(STATUS_OK, OPERATION)?;
        let user: UserResponse = reply.json(OPERATION)?;

        Ok(Identity {
            id: user.data.id,
            name: user.data.name,
            username: user.data.username,
        })
    }

    async fn get_user_tweets(
        &self,
        user_id: &str,
        count: usize,
    ) -> std::result::Result<Vec<HistoryItem>, RequestError> {
        const OPERATION: &str = "fetch recent";

        let mut url = self.endpoint(&["2", "users", user_id, "tweets"], OPERATION)?;
        let page_size = count.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        url.query_pairs_mut()
            .append_pair("max_results", &page_size.to_string());

        let reply = execute(self.transport.get(url)?, OPERATION)
            .await?
            .expect_status(STATUS_OK, OPERATION)?;
        let tweets: UserTweetsResponse = reply.json(OPERATION)?;

        Ok(tweets
            .data
            .into_iter()
            .take(count)
            .map(|t| HistoryItem {
                id: t.id,
                text: t.text,
            })
            .collect())
    }

    async fn create_tweet(&self, text: &str) -> std::result::Result<PublishResult, RequestError> {
        const OPERATION: &str = "publish";

        let url = self.endpoint(&["2", "tweets"], OPERATION)?;
        let request = self
            .transport
            .post_json(url, &CreateTweetRequest { text })?;
        let reply = execute(request, OPERATION)
            .await?
            .expect_status(STATUS_CREATED, OPERATION)?;
        let created: CreateTweetResponse = reply.json(OPERATION)?;

        Ok(PublishResult {
            id: created.data.id,
            text: created.data.text,
        })
    }
}

#[async_trait]
impl Platform for TwitterClient {
    async fn identify(&self) -> Result<Identity> {
        tracing::debug!("Looking up authenticated user");
        let identity = self.get_user().await.map_err(QuipcastError::Auth)?;
        tracing::debug!(id = %identity.id, username = %identity.username, "Authenticated");
        Ok(identity)
    }

    async fn fetch_recent(&self, identity: &Identity, count: usize) -> Result<Vec<HistoryItem>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        tracing::debug!(user_id = %identity.id, count, "Fetching recent posts");
        self.get_user_tweets(&identity.id, count)
            .await
            .map_err(QuipcastError::Fetch)
    }

    async fn publish(&self, text: &GeneratedText) -> Result<PublishResult> {
        tracing::debug!("Posting to X: {} characters", text.as_str().chars().count());
        let result = self
            .create_tweet(text.as_str())
            .await
            .map_err(QuipcastError::Publish)?;
        tracing::debug!(id = %result.id, "Posted to X");
        Ok(result)
    }

    fn permalink(&self, identity: &Identity, post_id: &str) -> String {
        format!("{}/{}/status/{}", self.web_base, identity.username, post_id)
    }

    fn name(&self) -> &str {
        "twitter"
    }
}
