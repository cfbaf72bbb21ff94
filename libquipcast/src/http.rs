//! Request execution shared by the platform and generation clients
//!
//! Every call goes through [`execute`], which reads the response body to the
//! end before returning so the connection is released even on error paths.

use serde::de::DeserializeOwned;

use crate::error::RequestError;

/// Status code and fully-read body of an HTTP response
#[derive(Debug, Clone)]
pub(crate) struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Send a request and read the whole response body
pub(crate) async fn execute(
    request: reqwest::RequestBuilder,
    operation: &'static str,
) -> Result<HttpReply, RequestError> {
    let response = request
        .send()
        .await
        .map_err(|e| map_reqwest_error(e, operation))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| map_reqwest_error(e, operation))?;

    tracing::debug!(operation, status, bytes = body.len(), "HTTP response received");

    Ok(HttpReply { status, body })
}

impl HttpReply {
    /// Reject any status other than `expected`, keeping the raw body for diagnosis
    pub fn expect_status(self, expected: u16, operation: &'static str) -> Result<Self, RequestError> {
        if self.status != expected {
            return Err(RequestError::Status {
                operation,
                status: self.status,
                body: self.body,
            });
        }
        Ok(self)
    }

    pub fn json<T: DeserializeOwned>(&self, operation: &'static str) -> Result<T, RequestError> {
        serde_json::from_str(&self.body).map_err(|e| RequestError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

fn map_reqwest_error(error: reqwest::Error, operation: &'static str) -> RequestError {
    if error.is_builder() {
        return RequestError::Build {
            operation,
            message: error.to_string(),
        };
    }

    let message = if error.is_timeout() {
        format!("timed out: {}", error)
    } else {
        error.to_string()
    };

    RequestError::Transport { operation, message }
}
