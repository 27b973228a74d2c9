use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spur_cache::CacheStore;
use spur_persist::{ChatMessage, LedgerStore};
use uuid::Uuid;

use crate::error::{ChatError, Result};
use crate::keys;
use crate::policy::ChatPolicy;

/// One page of history, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub messages: Vec<ChatMessage>,

    /// Pass back as `cursor` to fetch the next (older) page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Uuid>,
}

/// Cached first page together with the page size it was built for
#[derive(Debug, Serialize, Deserialize)]
struct CachedPage {
    limit: u32,
    page: HistoryPage,
}

/// Paginated, cached read access to the ledger
#[derive(Clone)]
pub struct HistoryService {
    ledger: Arc<dyn LedgerStore>,
    cache: Arc<dyn CacheStore>,
    policy: ChatPolicy,
}

impl HistoryService {
    pub fn new(ledger: Arc<dyn LedgerStore>, cache: Arc<dyn CacheStore>, policy: ChatPolicy) -> Self {
        Self {
            ledger,
            cache,
            policy,
        }
    }

    pub async fn get_history(
        &self,
        session_id: Uuid,
        cursor: Option<Uuid>,
        limit: Option<u32>,
    ) -> Result<HistoryPage> {
        let limit = self.resolve_limit(limit)?;
        let first_page = cursor.is_none();

        if first_page {
            if let Some(page) = self.cached_page(session_id, limit).await {
                tracing::debug!(%session_id, "History served from cache");
                return Ok(page);
            }
        }

        let mut messages = self
            .ledger
            .find_messages(session_id, limit as usize + 1, cursor)
            .await?;

        let next_cursor = if messages.len() > limit as usize {
            messages.truncate(limit as usize);
            messages.last().map(|m| m.id)
        } else {
            None
        };

        let page = HistoryPage {
            messages,
            next_cursor,
        };

        if first_page {
            self.store_page(session_id, limit, &page).await;
        }

        Ok(page)
    }

    fn resolve_limit(&self, limit: Option<u32>) -> Result<u32> {
        let limit = limit.unwrap_or(self.policy.default_history_limit);
        if limit == 0 || limit > self.policy.max_history_limit {
            return Err(ChatError::Validation(format!(
                "limit must be between 1 and {}",
                self.policy.max_history_limit
            )));
        }
        Ok(limit)
    }

    async fn cached_page(&self, session_id: Uuid, limit: u32) -> Option<HistoryPage> {
        let raw = match self.cache.get(&keys::history_page(session_id)).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "History cache read failed");
                return None;
            }
        };

        match serde_json::from_str::<CachedPage>(&raw) {
            Ok(cached) if cached.limit == limit => Some(cached.page),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "Discarding undecodable history cache entry");
                None
            }
        }
    }

    async fn store_page(&self, session_id: Uuid, limit: u32, page: &HistoryPage) {
        let entry = CachedPage {
            limit,
            page: page.clone(),
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "Failed to encode history page");
                return;
            }
        };

        if let Err(e) = self
            .cache
            .set(&keys::history_page(session_id), &raw, self.policy.history_cache_ttl())
            .await
        {
            tracing::warn!(%session_id, error = %e, "History cache write failed");
        }
    }
}
