//! Response cache for proxied routes
//!
//! Successful upstream bodies are kept per route for the configured TTL
//! (never more than ten minutes). Failures are not cached.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::pricing::UpstreamError;

/// Upper bound on how long any proxied response is reused
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(600);

struct CacheEntry {
    body: serde_json::Value,
    fetched_at: Instant,
}

pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        if ttl > MAX_CACHE_TTL {
            tracing::warn!(
                requested_secs = ttl.as_secs(),
                max_secs = MAX_CACHE_TTL.as_secs(),
                "Cache TTL clamped"
            );
        }

        Self {
            ttl: ttl.min(MAX_CACHE_TTL),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh body for `key`, if any
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.body.clone())
    }

    pub async fn insert(&self, key: &str, body: serde_json::Value) {
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                body,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, fresh or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Cached body for `key`, or the result of `fetch` stored on success
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        fetch: F,
    ) -> Result<serde_json::Value, UpstreamError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, UpstreamError>>,
    {
        if let Some(body) = self.get(key).await {
            tracing::trace!(route = %key, "Cache hit");
            return Ok(body);
        }

        let body = fetch().await?;
        self.insert(key, body.clone()).await;
        tracing::debug!(route = %key, "Cached upstream response");
        Ok(body)
    }
}
