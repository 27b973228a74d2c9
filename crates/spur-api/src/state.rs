use std::sync::Arc;

use spur_cache::CacheStore;
use spur_chat::{CompletionAdapter, HistoryService, SessionCoordinator};
use spur_llm::ChatClient;
use spur_persist::LedgerStore;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Capabilities are built once at startup and shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<dyn LedgerStore>,
    pub cache: Arc<dyn CacheStore>,
    pub coordinator: SessionCoordinator,
    pub history: HistoryService,
}

impl AppState {
    pub fn new(
        config: Config,
        ledger: Arc<dyn LedgerStore>,
        cache: Arc<dyn CacheStore>,
        chat_client: Arc<dyn ChatClient>,
    ) -> Self {
        let completion = CompletionAdapter::new(chat_client)
            .with_model(config.llm.model.as_str())
            .with_options(config.llm.options())
            .with_timeout(config.llm.timeout());

        let coordinator =
            SessionCoordinator::new(ledger.clone(), cache.clone(), completion, config.chat.clone());
        let history = HistoryService::new(ledger.clone(), cache.clone(), config.chat.clone());

        Self {
            config: Arc::new(config),
            ledger,
            cache,
            coordinator,
            history,
        }
    }
}
