use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ChatMessage, MessageRole, Session};
use crate::trait_client::LedgerStore;

/// Process-local ledger for tests and single-instance development
///
/// Each session's messages are kept in append order, which is creation order.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    sessions: HashMap<Uuid, Session>,
    messages: HashMap<Uuid, Vec<ChatMessage>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session(&self, session_id: Uuid) -> Option<Session> {
        self.state.read().await.sessions.get(&session_id).cloned()
    }

    /// All messages of a session, oldest first
    pub async fn messages(&self, session_id: Uuid) -> Vec<ChatMessage> {
        self.state
            .read()
            .await
            .messages
            .get(&session_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn count_messages(&self, session_id: Uuid) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.messages.get(&session_id).map_or(0, |m| m.len() as u64))
    }

    async fn upsert_session(&self, session_id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        state.sessions.entry(session_id).or_insert_with(|| Session {
            id: session_id,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn create_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage> {
        let message = ChatMessage::new(session_id, role, content);
        let mut state = self.state.write().await;
        state
            .messages
            .entry(session_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn find_messages(
        &self,
        session_id: Uuid,
        limit: usize,
        before: Option<Uuid>,
    ) -> Result<Vec<ChatMessage>> {
        let state = self.state.read().await;
        let Some(messages) = state.messages.get(&session_id) else {
            return Ok(Vec::new());
        };

        let end = match before {
            Some(cursor) => match messages.iter().position(|m| m.id == cursor) {
                Some(idx) => idx,
                None => return Ok(Vec::new()),
            },
            None => messages.len(),
        };

        Ok(messages[..end].iter().rev().take(limit).cloned().collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
