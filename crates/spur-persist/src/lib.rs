pub mod models;
pub mod trait_client;
pub mod dbs;
pub mod error;

pub use models::{ChatMessage, MessageRole, Session};
pub use trait_client::LedgerStore;
pub use dbs::memory::MemoryLedger;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoLedger;
pub use error::PersistError;
