//! Chat-completion HTTP client (OpenAI-compatible wire format)

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::{GenerationConfig, HttpConfig};
use crate::error::{GenerationError, RequestError, Result};
use crate::generation::{Backend, GenerationRequest, Generator};
use crate::http::execute;
use crate::types::{ChatMessage, GeneratedText, HistoryItem};

const OPERATION: &str = "generate";
const STATUS_OK: u16 = 200;

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionClient {
    http: reqwest::Client,
    api_key: SecretString,
    endpoint_override: Option<String>,
    max_tokens: u32,
}

impl ChatCompletionClient {
    /// Create a client with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `QuipcastError::Generation` if the HTTP client cannot be built.
    pub fn new(config: GenerationConfig, http: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(http.timeout)
            .user_agent(http.user_agent.as_str())
            .build()
            .map_err(|e| {
                GenerationError::Request(RequestError::Build {
                    operation: "create HTTP client",
                    message: e.to_string(),
                })
            })?;

        Ok(Self {
            http: client,
            api_key: config.api_key,
            endpoint_override: config.endpoint,
            max_tokens: config.max_tokens,
        })
    }

    /// URL the request for `backend` is sent to
    pub fn endpoint_for(&self, backend: Backend) -> &str {
        self.endpoint_override
            .as_deref()
            .unwrap_or_else(|| backend.endpoint())
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GeneratedText, GenerationError> {
        let body = ChatCompletionBody {
            model: request.backend.model(),
            messages: &request.messages,
            max_tokens: request.max_tokens,
        };

        let builder = self
            .http
            .post(self.endpoint_for(request.backend))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body);

        let reply = execute(builder, OPERATION)
            .await?
            .expect_status(STATUS_OK, OPERATION)?;
        let response: ChatCompletionResponse = reply.json(OPERATION)?;

        let first = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::NoChoices {
                backend: request.backend.id().to_string(),
            })?;

        GeneratedText::normalize(first.message.content.as_deref().unwrap_or_default())
    }
}

#[async_trait]
impl Generator for ChatCompletionClient {
    async fn generate(&self, backend: Backend, history: &[HistoryItem]) -> Result<GeneratedText> {
        let request = GenerationRequest::new(backend, history, self.max_tokens);

        tracing::debug!(
            backend = %backend,
            model = backend.model(),
            endpoint = self.endpoint_for(backend),
            history = history.len(),
            "Requesting completion"
        );

        Ok(self.complete(&request).await?)
    }
}
