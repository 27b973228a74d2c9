#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use spur_cache::{CacheError, CacheStore, MemoryCache};
use spur_chat::{ChatPolicy, CompletionAdapter, HistoryService, SessionCoordinator};
use spur_llm::{ChatClient, ChatRequest, ChatResponse};
use spur_persist::{ChatMessage, LedgerStore, MemoryLedger, MessageRole, PersistError};
use tokio::sync::Notify;
use uuid::Uuid;

/// Answers from a script, then with a default reply; records every request
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<anyhow::Result<Option<String>>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_reply(self, text: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(Some(text.to_string())));
        self
    }

    pub fn then_empty(self) -> Self {
        self.script.lock().unwrap().push_back(Ok(None));
        self
    }

    pub fn then_fail(self, reason: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!(reason.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(Some(text))) => Ok(ChatResponse::text(text)),
            Some(Ok(None)) => Ok(ChatResponse {
                content: None,
                usage: None,
                finish_reason: Some("SAFETY".to_string()),
                raw: serde_json::Value::Null,
            }),
            Some(Err(e)) => Err(e),
            None => Ok(ChatResponse::text("Happy to help!")),
        }
    }
}

/// Parks inside the provider call until released
pub struct GatedClient {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedClient {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl ChatClient for GatedClient {
    async fn chat(&self, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(ChatResponse::text("done"))
    }
}

/// Never answers
pub struct StalledClient;

#[async_trait]
impl ChatClient for StalledClient {
    async fn chat(&self, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
        std::future::pending().await
    }
}

pub struct PanickingClient;

#[async_trait]
impl ChatClient for PanickingClient {
    async fn chat(&self, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
        panic!("provider blew up")
    }
}

/// In-memory ledger that refuses to store replies
pub struct ReplyRejectingLedger {
    pub inner: MemoryLedger,
}

#[async_trait]
impl LedgerStore for ReplyRejectingLedger {
    async fn count_messages(&self, session_id: Uuid) -> Result<u64, PersistError> {
        self.inner.count_messages(session_id).await
    }

    async fn upsert_session(&self, session_id: Uuid) -> Result<(), PersistError> {
        self.inner.upsert_session(session_id).await
    }

    async fn create_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, PersistError> {
        if role == MessageRole::Ai {
            return Err(PersistError::Internal("disk full".to_string()));
        }
        self.inner.create_message(session_id, role, content).await
    }

    async fn find_messages(
        &self,
        session_id: Uuid,
        limit: usize,
        before: Option<Uuid>,
    ) -> Result<Vec<ChatMessage>, PersistError> {
        self.inner.find_messages(session_id, limit, before).await
    }

    async fn ping(&self) -> Result<(), PersistError> {
        Ok(())
    }
}

/// In-memory cache whose history entries cannot be deleted
#[derive(Default)]
pub struct HistoryUndeletableCache {
    pub inner: MemoryCache,
}

#[async_trait]
impl CacheStore for HistoryUndeletableCache {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError> {
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        if key.starts_with("chat_history:") {
            return Err(CacheError::Connection("connection reset by peer".to_string()));
        }
        self.inner.delete(key).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Coordinator and history service over shared in-memory backends
pub struct Harness {
    pub ledger: Arc<MemoryLedger>,
    pub cache: Arc<MemoryCache>,
    pub coordinator: SessionCoordinator,
    pub history: HistoryService,
}

impl Harness {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self::with_policy(client, ChatPolicy::default())
    }

    pub fn with_policy(client: Arc<dyn ChatClient>, policy: ChatPolicy) -> Self {
        Self::with_adapter(CompletionAdapter::new(client), policy)
    }

    pub fn with_adapter(adapter: CompletionAdapter, policy: ChatPolicy) -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        let cache = Arc::new(MemoryCache::new());
        let coordinator =
            SessionCoordinator::new(ledger.clone(), cache.clone(), adapter, policy.clone());
        let history = HistoryService::new(ledger.clone(), cache.clone(), policy);
        Self {
            ledger,
            cache,
            coordinator,
            history,
        }
    }
}

pub fn stalled_adapter(timeout: Duration) -> CompletionAdapter {
    CompletionAdapter::new(Arc::new(StalledClient)).with_timeout(timeout)
}

/// Text of every message in a request, in order
pub fn texts(request: &ChatRequest) -> Vec<String> {
    request
        .messages
        .iter()
        .map(|m| m.content().as_text().unwrap_or_default().to_string())
        .collect()
}
