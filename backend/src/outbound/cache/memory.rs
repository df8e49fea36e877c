//! In-process TTL cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::ports::{ResponseCache, ResponseCacheError, ResponseCacheKey};

struct Entry {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// [`ResponseCache`] backed by a mutex-guarded map.
///
/// Expired entries are dropped lazily on read and swept on every write.
pub struct MemoryResponseCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryResponseCache {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl MemoryResponseCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl ResponseCache for MemoryResponseCache {
    async fn get(&self, key: &ResponseCacheKey) -> Result<Option<Value>, ResponseCacheError> {
        let now = self.clock.utc();
        let mut entries = self.entries.lock().await;
        match entries.get(key.as_str()) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key.as_str());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &ResponseCacheKey,
        value: &Value,
        ttl: Duration,
    ) -> Result<(), ResponseCacheError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|err| ResponseCacheError::backend(format!("ttl out of range: {err}")))?;
        let now = self.clock.utc();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.as_str().to_owned(),
            Entry {
                value: value.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
