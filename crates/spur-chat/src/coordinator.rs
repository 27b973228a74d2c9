use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use spur_cache::CacheStore;
use spur_persist::{LedgerStore, MessageRole};
use uuid::Uuid;

use crate::completion::{CompletionAdapter, CompletionOutcome};
use crate::context::ContextAssembler;
use crate::error::{ChatError, Result};
use crate::keys;
use crate::policy::ChatPolicy;
use crate::templates::{EMPTY_REPLY_FALLBACK, PROVIDER_FAILURE_FALLBACK};

/// Result of a completed turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    pub reply: String,
    pub session_id: Uuid,
}

/// Sequences one conversational turn per session
///
/// Turns for the same session are serialised by a TTL lock held in the
/// cache service, so several coordinators may share one cache. The lock is
/// best-effort: a turn that outlives its TTL lets the next turn in.
#[derive(Clone)]
pub struct SessionCoordinator {
    ledger: Arc<dyn LedgerStore>,
    cache: Arc<dyn CacheStore>,
    assembler: ContextAssembler,
    completion: CompletionAdapter,
    policy: ChatPolicy,
}

impl SessionCoordinator {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        cache: Arc<dyn CacheStore>,
        completion: CompletionAdapter,
        policy: ChatPolicy,
    ) -> Self {
        let assembler = ContextAssembler::new(ledger.clone(), policy.context_window);
        Self {
            ledger,
            cache,
            assembler,
            completion,
            policy,
        }
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    /// Run one turn: validate, lock, check quota, complete, persist
    pub async fn handle_turn(&self, session_id: Option<Uuid>, text: &str) -> Result<TurnReply> {
        self.validate(text)?;

        let session_id = session_id.unwrap_or_else(Uuid::new_v4);
        let lock_key = keys::turn_lock(session_id);

        let acquired = self
            .cache
            .set_if_absent(&lock_key, keys::TURN_LOCKED, self.policy.lock_ttl())
            .await?;
        if !acquired {
            tracing::info!(%session_id, "Turn rejected, session is locked");
            return Err(ChatError::TurnInProgress(session_id));
        }

        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.run_turn(session_id, text))
            .catch_unwind()
            .await;

        if let Err(e) = self.cache.delete(&lock_key).await {
            // Expiry will free it
            tracing::error!(%session_id, error = %e, "Failed to release turn lock");
        }

        match outcome {
            Ok(result) => {
                match &result {
                    Ok(_) => tracing::info!(
                        %session_id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Turn completed"
                    ),
                    Err(e) => tracing::warn!(%session_id, error = %e, "Turn failed"),
                }
                result
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    fn validate(&self, text: &str) -> Result<()> {
        let chars = text.chars().count();
        if chars == 0 {
            return Err(ChatError::Validation("message must not be empty".to_string()));
        }
        if chars > self.policy.max_message_chars {
            return Err(ChatError::Validation(format!(
                "message must be at most {} characters",
                self.policy.max_message_chars
            )));
        }
        Ok(())
    }

    async fn run_turn(&self, session_id: Uuid, text: &str) -> Result<TurnReply> {
        let count = self.ledger.count_messages(session_id).await?;
        if count >= self.policy.max_messages_per_session {
            tracing::info!(%session_id, count, "Conversation limit reached");
            return Err(ChatError::LimitReached {
                session_id,
                limit: self.policy.max_messages_per_session,
            });
        }

        self.cache
            .set(
                &keys::session_marker(session_id),
                keys::SESSION_ACTIVE,
                self.policy.session_ttl(),
            )
            .await?;

        self.ledger.upsert_session(session_id).await?;

        let inbound = self
            .ledger
            .create_message(session_id, MessageRole::User, text)
            .await?;

        let window = self
            .assembler
            .build_window(session_id, Some(inbound.id))
            .await?;

        let reply = match self.completion.complete(&window, text).await {
            CompletionOutcome::Reply(reply) => reply,
            CompletionOutcome::Empty => {
                tracing::warn!(%session_id, "Provider returned no text, using fallback");
                EMPTY_REPLY_FALLBACK.to_string()
            }
            CompletionOutcome::Failed(reason) => {
                tracing::warn!(%session_id, %reason, "Provider call failed, using fallback");
                PROVIDER_FAILURE_FALLBACK.to_string()
            }
        };

        self.ledger
            .create_message(session_id, MessageRole::Ai, &reply)
            .await?;

        // Turn is already committed
        if let Err(e) = self.cache.delete(&keys::history_page(session_id)).await {
            tracing::error!(%session_id, error = %e, "Failed to invalidate history cache");
        }

        Ok(TurnReply { reply, session_id })
    }
}
