//! JSON-over-HTTP transport
//!
//! Every remote read in this crate (index price feeds, rebalance history,
//! reference prices) is a plain GET returning JSON.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Source of JSON documents addressed by URL
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, UpstreamError>;
}

/// [`Upstream`] over `reqwest`
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new(request_timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("bit10/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, UpstreamError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout
            } else if e.is_connect() {
                UpstreamError::Unavailable
            } else {
                UpstreamError::Request(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid JSON body: {0}")]
    Decode(String),
}

/// Join a base URL and a path segment with exactly one slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://testnet.bit10.app/", "/bit10-top-current-price"),
            "https://testnet.bit10.app/bit10-top-current-price"
        );
        assert_eq!(join_url("http://a", "b"), "http://a/b");
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpUpstream::new(Duration::from_millis(500)).is_ok());
    }
}
