//! Port for short-lived replayable responses.
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ResponseCacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum ResponseCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "response cache backend failure: {message}"; ServiceUnavailable,
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "response cache serialisation failed: {message}"; InternalError,
    }
}

/// Key/value store with per-entry TTL.
///
/// An in-process adapter only deduplicates retries that land on the same
/// instance; deployments with several instances should use a shared backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Read a live entry.
    async fn get(&self, key: &ResponseCacheKey) -> Result<Option<Value>, ResponseCacheError>;

    /// Store `value` for `ttl`, replacing any previous entry.
    async fn put(
        &self,
        key: &ResponseCacheKey,
        value: &Value,
        ttl: Duration,
    ) -> Result<(), ResponseCacheError>;
}
