mod message;
mod session;

pub use message::{ChatMessage, MessageRole};
pub use session::Session;
