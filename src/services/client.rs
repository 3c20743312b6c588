//! Outbound JSON calls to sibling services.

use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

use crate::observability::tracing::{propagate, CorrelationId};
use crate::resilience::TimedOut;

/// Failure of one downstream call.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Timeout(#[from] TimedOut),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status code {0}")]
    Status(u16),

    #[error("invalid downstream URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CallError {
    /// HTTP status of the downstream answer, when one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            CallError::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// JSON client bound to one base URL.
#[derive(Debug, Clone)]
pub struct DownstreamClient {
    http: reqwest::Client,
    base: Url,
}

impl DownstreamClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, CallError> {
        Ok(Self {
            http,
            base: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// GET `path` and decode the body as JSON. Non-2xx answers are errors.
    pub async fn get_json(&self, path: &str, correlation: &CorrelationId) -> Result<Value, CallError> {
        let url = self.base.join(path)?;
        tracing::debug!(url = %url, request_id = ?correlation.as_deref(), "Calling downstream");

        let response = propagate(self.http.get(url), correlation).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(CallError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rejects_bad_base_url() {
        let err = DownstreamClient::new(reqwest::Client::new(), "not a url").unwrap_err();
        assert!(matches!(err, CallError::Url(_)));
    }

    #[test]
    fn test_joins_absolute_paths() {
        let client = DownstreamClient::new(reqwest::Client::new(), "http://localhost:3002").unwrap();
        let url = client.base_url().join("/api/unreliable").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3002/api/unreliable");
    }

    #[test]
    fn test_error_messages() {
        let status = CallError::Status(500);
        assert_eq!(status.to_string(), "Request failed with status code 500");
        assert_eq!(status.status(), Some(500));

        let timeout = CallError::from(TimedOut(Duration::from_millis(3000)));
        assert_eq!(timeout.to_string(), "timeout of 3000ms exceeded");
        assert_eq!(timeout.status(), None);
    }
}
