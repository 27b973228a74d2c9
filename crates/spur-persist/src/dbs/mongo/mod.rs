mod client;
mod models;

pub use client::MongoLedger;
pub use models::{MongoMessage, MongoSession};
