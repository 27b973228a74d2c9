pub mod types;
pub mod traits;
pub mod config;
pub mod gemini;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions, TokenUsage};
pub use config::GeminiConfig;
pub use gemini::GeminiClient;
pub use types::{Message, Content, ContentPart};
