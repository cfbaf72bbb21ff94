//! Error types for Quipcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuipcastError>;

#[derive(Error, Debug)]
pub enum QuipcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(RequestError),

    #[error("History fetch failed: {0}")]
    Fetch(RequestError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Publishing failed: {0}")]
    Publish(RequestError),

    #[error("Run cancelled: {0}")]
    Cancelled(String),
}

impl QuipcastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            QuipcastError::Config(_) => 3,
            QuipcastError::Auth(_) => 2,
            QuipcastError::Cancelled(_) => 130,
            QuipcastError::Fetch(_) | QuipcastError::Generation(_) | QuipcastError::Publish(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failure of a single HTTP interaction, tagged with the operation that issued it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("{operation}: failed to build request: {message}")]
    Build {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: request failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: API error (status {status}): {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation}: failed to decode response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl RequestError {
    /// The operation that produced this error
    pub fn operation(&self) -> &'static str {
        match self {
            RequestError::Build { operation, .. }
            | RequestError::Transport { operation, .. }
            | RequestError::Status { operation, .. }
            | RequestError::Decode { operation, .. } => operation,
        }
    }

    /// Upstream HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{0}")]
    Request(#[from] RequestError),

    #[error("no choices in response from {backend}")]
    NoChoices { backend: String },

    #[error("generated text is empty after normalization")]
    EmptyText,
}
