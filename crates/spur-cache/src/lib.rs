pub mod error;
pub mod store;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;

pub use error::CacheError;
pub use store::CacheStore;
pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_store::RedisCache;
