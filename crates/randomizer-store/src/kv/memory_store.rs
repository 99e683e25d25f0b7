//! In-process key-value store.
//!
//! Used for single-node deployments and tests. Failure injection switches
//! let callers exercise rollback paths without a real backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use randomizer_core::{DomainError, KeyValueStore, RepoResult};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    stall_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with one value
    #[must_use]
    pub fn with_value(key: &str, value: Value) -> Self {
        let store = Self::default();
        store.values.write().insert(key.to_string(), value);
        store
    }

    /// Make subsequent reads fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes never complete
    pub fn set_stall_writes(&self, stall: bool) {
        self.stall_writes.store(stall, Ordering::SeqCst);
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current value without going through the port
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    /// Overwrite a value directly, bypassing failure injection
    pub fn put(&self, key: &str, value: Value) {
        self.values.write().insert(key.to_string(), value);
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_value(&self, key: &str) -> RepoResult<Option<Value>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::Store("read unavailable".to_string()));
        }
        Ok(self.values.read().get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &Value) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Store("write rejected".to_string()));
        }
        if self.stall_writes.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.values.write().insert(key.to_string(), value.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_and_set() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get_value("k").await.unwrap(), None);

        store.set_value("k", &json!({ "a": 1 })).await.unwrap();
        assert_eq!(store.get_value("k").await.unwrap(), Some(json!({ "a": 1 })));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryKeyValueStore::with_value("k", json!(1));
        store.set_fail_writes(true);
        assert!(store.set_value("k", &json!(2)).await.is_err());
        assert_eq!(store.snapshot("k"), Some(json!(1)));

        store.set_fail_reads(true);
        assert!(store.get_value("k").await.is_err());
    }

    #[tokio::test]
    async fn test_stalled_write_never_lands() {
        let store = MemoryKeyValueStore::with_value("k", json!(1));
        store.set_stall_writes(true);
        let value = json!(2);
        let write = store.set_value("k", &value);
        let result = tokio::time::timeout(std::time::Duration::from_millis(10), write).await;
        assert!(result.is_err());
        assert_eq!(store.snapshot("k"), Some(json!(1)));
        assert_eq!(store.write_count(), 0);
    }
}
