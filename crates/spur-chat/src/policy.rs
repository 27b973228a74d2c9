use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Limits and expiries applied to every turn and history read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPolicy {
    /// Inclusive upper bound on inbound message length, in characters
    pub max_message_chars: usize,
    /// Messages (user + ai) a session may hold before turns are refused
    pub max_messages_per_session: u64,
    /// Prior messages sent to the provider with each turn
    pub context_window: usize,
    pub lock_ttl_secs: u64,
    pub session_ttl_secs: u64,
    /// Independent of `session_ttl_secs`; invalidation keeps the cache fresh
    pub history_cache_ttl_secs: u64,
    pub default_history_limit: u32,
    pub max_history_limit: u32,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_message_chars: 250,
            max_messages_per_session: 100,
            context_window: 10,
            lock_ttl_secs: 30,
            session_ttl_secs: 1800,
            history_cache_ttl_secs: 1800,
            default_history_limit: 50,
            max_history_limit: 100,
        }
    }
}

impl ChatPolicy {
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn history_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.history_cache_ttl_secs)
    }
}
