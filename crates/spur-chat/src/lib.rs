//! Message-turn coordination for the Spur support agent
//!
//! The crate sequences one conversational turn (lock, quota, context window,
//! completion, persistence, cache invalidation) and serves cached history
//! pages. Storage, cache and model provider are injected capabilities.

pub mod error;
pub mod policy;
pub mod keys;
pub mod templates;
pub mod context;
pub mod completion;
pub mod coordinator;
pub mod history;

pub use error::{ChatError, Result};
pub use policy::ChatPolicy;
pub use context::{ContextAssembler, ContextTurn, TurnRole};
pub use completion::{CompletionAdapter, CompletionOutcome};
pub use coordinator::{SessionCoordinator, TurnReply};
pub use history::{HistoryPage, HistoryService};
pub use templates::{
    ACKNOWLEDGEMENT, DEFAULT_MODEL, EMPTY_REPLY_FALLBACK, PROVIDER_FAILURE_FALLBACK, SYSTEM_PROMPT,
};
