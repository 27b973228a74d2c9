// In-memory TTL cache

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;
use crate::store::CacheStore;

/// Cached value with expiration
#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    expires_at: Instant,
}

impl CachedValue {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local cache; only serialises turns within one process
#[derive(Debug, Default)]
pub struct MemoryCache {
    store: Mutex<HashMap<String, CachedValue>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove expired entries, returns how many were dropped
    pub async fn cleanup_expired(&self) -> usize {
        let mut store = self.store.lock().await;
        let before = store.len();
        store.retain(|_, v| !v.is_expired());
        let dropped = before - store.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Expired cache entries removed");
        }
        dropped
    }

    /// Number of live (unexpired) entries
    pub async fn len(&self) -> usize {
        self.store
            .lock()
            .await
            .values()
            .filter(|v| !v.is_expired())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut store = self.store.lock().await;
        if store.get(key).is_some_and(|cached| !cached.is_expired()) {
            return Ok(false);
        }
        store.insert(key.to_string(), CachedValue::new(value, ttl));
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut store = self.store.lock().await;
        match store.get(key) {
            Some(cached) if cached.is_expired() => {
                store.remove(key);
                Ok(None)
            }
            Some(cached) => Ok(Some(cached.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.store
            .lock()
            .await
            .insert(key.to_string(), CachedValue::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.lock().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
