//! Mock platform implementation for testing
//!
//! This module provides a configurable mock platform that can simulate
//! successes, failures, and delays for each of the three platform operations.
//! It's designed for use in pipeline tests to verify stage ordering and the
//! failure policy without requiring credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{QuipcastError, RequestError, Result};
use crate::platforms::Platform;
use crate::types::{GeneratedText, HistoryItem, Identity, PublishResult};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock-twitter")
    pub name: String,

    /// Identity returned by `identify`
    pub identity: Identity,

    /// Posts returned by `fetch_recent`, newest first
    pub history: Vec<HistoryItem>,

    /// Id assigned to published posts
    pub publish_id: String,

    /// Error to return from `identify`
    pub identify_error: Option<String>,

    /// Error to return from `fetch_recent`
    pub fetch_error: Option<String>,

    /// Error to return from `publish`
    pub publish_error: Option<String>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Number of times identify has been called
    pub identify_call_count: Arc<Mutex<usize>>,

    /// Number of times fetch_recent has been called
    pub fetch_call_count: Arc<Mutex<usize>>,

    /// Number of times publish has been called
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Texts that have been published (for verification)
    pub published_content: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            identity: Identity {
                id: "42".to_string(),
                name: "Dev Bot".to_string(),
                username: "dev".to_string(),
            },
            history: Vec::new(),
            publish_id: "99".to_string(),
            identify_error: None,
            fetch_error: None,
            publish_error: None,
            delay: Duration::from_millis(0),
            identify_call_count: Arc::new(Mutex::new(0)),
            fetch_call_count: Arc::new(Mutex::new(0)),
            publish_call_count: Arc::new(Mutex::new(0)),
            published_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
///
/// Cloning shares the call counters, so a test can hand one clone to the
/// pipeline and inspect the other afterwards.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform whose account has the given post history
    pub fn with_history(name: &str, texts: &[&str]) -> Self {
        let history = texts
            .iter()
            .enumerate()
            .map(|(i, text)| HistoryItem {
                id: format!("{}", 1000 - i),
                text: text.to_string(),
            })
            .collect();

        Self::new(MockConfig {
            name: name.to_string(),
            history,
            ..Default::default()
        })
    }

    /// Create a mock platform that fails identity lookup
    pub fn identify_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            identify_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails to fetch history
    pub fn fetch_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            fetch_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails publishing
    pub fn publish_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            publish_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform with a delay
    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    /// Get the number of times identify was called
    pub fn identify_call_count(&self) -> usize {
        *self.config.identify_call_count.lock().unwrap()
    }

    /// Get the number of times fetch_recent was called
    pub fn fetch_call_count(&self) -> usize {
        *self.config.fetch_call_count.lock().unwrap()
    }

    /// Get the number of times publish was called
    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    /// Get all text that was published
    pub fn published_content(&self) -> Vec<String> {
        self.config.published_content.lock().unwrap().clone()
    }

    async fn simulate_latency(&self) {
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
    }
}

fn mock_error(operation: &'static str, message: &str) -> RequestError {
    RequestError::Transport {
        operation,
        message: message.to_string(),
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn identify(&self) -> Result<Identity> {
        *self.config.identify_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;

        match &self.config.identify_error {
            Some(error) => Err(QuipcastError::Auth(mock_error("identify", error))),
            None => Ok(self.config.identity.clone()),
        }
    }

    async fn fetch_recent(&self, _identity: &Identity, count: usize) -> Result<Vec<HistoryItem>> {
        *self.config.fetch_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;

        match &self.config.fetch_error {
            Some(error) => Err(QuipcastError::Fetch(mock_error("fetch recent", error))),
            None => Ok(self.config.history.iter().take(count).cloned().collect()),
        }
    }

    async fn publish(&self, text: &GeneratedText) -> Result<PublishResult> {
        *self.config.publish_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;

        if let Some(error) = &self.config.publish_error {
            return Err(QuipcastError::Publish(mock_error("publish", error)));
        }

        self.config
            .published_content
            .lock()
            .unwrap()
            .push(text.as_str().to_string());

        Ok(PublishResult {
            id: self.config.publish_id.clone(),
            text: text.as_str().to_string(),
        })
    }

    fn permalink(&self, identity: &Identity, post_id: &str) -> String {
        format!("https://mock.example/{}/status/{}", identity.username, post_id)
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
