//! Redis-backed response cache.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::ports::{ResponseCache, ResponseCacheError, ResponseCacheKey};

const KEY_PREFIX: &str = "clinic-newsletter";

/// [`ResponseCache`] storing JSON strings under `clinic-newsletter:{key}`
/// with a Redis-side expiry.
#[derive(Clone)]
pub struct RedisResponseCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisResponseCache {
    /// Connect to `url` (for example `redis://localhost:6379`).
    pub async fn connect(url: &str) -> Result<Self, ResponseCacheError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        info!("connected response cache to redis");
        Ok(Self { pool })
    }

    fn storage_key(key: &ResponseCacheKey) -> String {
        format!("{KEY_PREFIX}:{key}")
    }
}

/// Redis rejects `SETEX` with a zero expiry.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &ResponseCacheKey) -> Result<Option<Value>, ResponseCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        let raw: Option<String> = conn
            .get(Self::storage_key(key))
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        debug!(key = %key, hit = raw.is_some(), "response cache lookup");
        raw.map(|text| {
            serde_json::from_str(&text)
                .map_err(|err| ResponseCacheError::serialization(err.to_string()))
        })
        .transpose()
    }

    async fn put(
        &self,
        key: &ResponseCacheKey,
        value: &Value,
        ttl: Duration,
    ) -> Result<(), ResponseCacheError> {
        let text = serde_json::to_string(value)
            .map_err(|err| ResponseCacheError::serialization(err.to_string()))?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        let _: () = conn
            .set_ex(Self::storage_key(key), text, expiry_seconds(ttl))
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_secs(300), 300)]
    #[case(Duration::from_millis(200), 1)]
    #[case(Duration::ZERO, 1)]
    fn expiry_is_at_least_one_second(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(expiry_seconds(ttl), expected);
    }

    #[rstest]
    fn keys_are_namespaced() {
        let key = ResponseCacheKey::new("export:org_a:k1").expect("valid key");
        assert_eq!(
            RedisResponseCache::storage_key(&key),
            "clinic-newsletter:export:org_a:k1"
        );
    }
}
