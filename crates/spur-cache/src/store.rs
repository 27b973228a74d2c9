use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Shared key-value store with per-key expiry
///
/// `set_if_absent` is the only atomic primitive; it backs the per-session
/// turn lock. Everything else is last-write-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` only if `key` is absent (or expired); `true` when stored
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value`, replacing any previous value and expiry
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<()>;
}
