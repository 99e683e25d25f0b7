//! # randomizer-store
//!
//! Persistence layer for the shared settings blob.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Key-Value Stores**: Redis-backed and in-process implementations of `KeyValueStore`
//! - **Persistence Gateway**: Typed, never-failing read/write and read-modify-write of the blob
//!
//! ## Example
//!
//! ```ignore
//! use randomizer_store::{MemoryKeyValueStore, PersistenceGateway};
//!
//! let gateway = PersistenceGateway::new(Arc::new(MemoryKeyValueStore::new()));
//! let written = gateway
//!     .modify_settings(|settings| settings.with_selection("team-1", ids))
//!     .await;
//! ```

pub mod gateway;
pub mod kv;
pub mod pool;

pub use gateway::{PersistenceGateway, SETTINGS_KEY};
pub use kv::{MemoryKeyValueStore, RedisKeyValueStore};
pub use pool::{RedisPool, RedisPoolError, RedisResult};
