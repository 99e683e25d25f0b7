//! Key-value store adapters.

mod memory_store;
mod redis_store;

pub use memory_store::MemoryKeyValueStore;
pub use redis_store::RedisKeyValueStore;
