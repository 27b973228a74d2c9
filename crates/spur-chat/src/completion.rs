use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use spur_llm::{ChatClient, ChatOptions, ChatRequest, Message};

use crate::context::ContextTurn;
use crate::templates::{ACKNOWLEDGEMENT, DEFAULT_MODEL, SYSTEM_PROMPT};

/// Default bound on one provider call, below the turn lock TTL
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(25);

/// What the provider produced for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Reply(String),
    /// The call succeeded but carried no usable text
    Empty,
    /// Transport error, API error, timeout or a panicking client
    Failed(String),
}

/// Wraps the chat provider with the persona preamble and a hard deadline
#[derive(Clone)]
pub struct CompletionAdapter {
    client: Arc<dyn ChatClient>,
    model: String,
    options: ChatOptions,
    timeout: Duration,
    preamble: String,
    acknowledgement: String,
}

impl CompletionAdapter {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            options: ChatOptions::default(),
            timeout: DEFAULT_COMPLETION_TIMEOUT,
            preamble: SYSTEM_PROMPT.to_string(),
            acknowledgement: ACKNOWLEDGEMENT.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_prompts(
        mut self,
        preamble: impl Into<String>,
        acknowledgement: impl Into<String>,
    ) -> Self {
        self.preamble = preamble.into();
        self.acknowledgement = acknowledgement.into();
        self
    }

    /// Preamble, acknowledgement, prior turns, then the new message
    pub fn build_messages(&self, window: &[ContextTurn], new_message: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(window.len() + 3);
        messages.push(Message::human(self.preamble.as_str()));
        messages.push(Message::ai(self.acknowledgement.as_str()));
        messages.extend(window.iter().cloned().map(Message::from));
        messages.push(Message::human(new_message));
        messages
    }

    pub async fn complete(&self, window: &[ContextTurn], new_message: &str) -> CompletionOutcome {
        let request = ChatRequest::new(self.model.as_str(), self.build_messages(window, new_message))
            .with_options(self.options.clone());

        let call = AssertUnwindSafe(self.client.chat(request)).catch_unwind();

        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => CompletionOutcome::Failed(format!(
                "provider did not answer within {}s",
                self.timeout.as_secs_f32()
            )),
            Ok(Err(panic)) => CompletionOutcome::Failed(format!(
                "provider client panicked: {}",
                panic_message(panic.as_ref())
            )),
            Ok(Ok(Err(e))) => CompletionOutcome::Failed(format!("{:#}", e)),
            Ok(Ok(Ok(response))) => match response.content {
                Some(text) if !text.trim().is_empty() => CompletionOutcome::Reply(text),
                _ => CompletionOutcome::Empty,
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
