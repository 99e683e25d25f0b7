//! Persistence gateway - typed access to the shared settings blob
//!
//! Every operation is infallible from the caller's point of view: failures
//! are logged and surface as `None` or `false`.

use std::sync::Arc;

use randomizer_core::{KeyValueStore, RandomizerSettings};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

/// Default key of the shared settings blob
pub const SETTINGS_KEY: &str = "availableMembers";

#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
    settings_key: String,
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("settings_key", &self.settings_key)
            .finish()
    }
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, SETTINGS_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, settings_key: impl Into<String>) -> Self {
        Self {
            store,
            settings_key: settings_key.into(),
        }
    }

    pub fn settings_key(&self) -> &str {
        &self.settings_key
    }

    /// Typed read; `None` when missing, unreadable or of the wrong shape
    #[instrument(skip(self))]
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get_value(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(typed) => Some(typed),
                Err(e) => {
                    warn!(error = %e, "Stored value has an unexpected shape");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, "Failed to read value");
                None
            }
        }
    }

    /// Typed whole-value write; `false` on failure
    #[instrument(skip(self, value))]
    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "Failed to serialize value");
                return false;
            }
        };
        match self.store.set_value(key, &value).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to write value");
                false
            }
        }
    }

    /// Fetch the latest settings blob.
    ///
    /// A blob that was never written reads as empty; `None` means the read
    /// itself failed.
    pub async fn load_settings(&self) -> Option<RandomizerSettings> {
        match self.store.get_value(&self.settings_key).await {
            Ok(Some(value)) => Some(RandomizerSettings::from_value(value)),
            Ok(None) => Some(RandomizerSettings::default()),
            Err(e) => {
                error!(key = %self.settings_key, error = %e, "Failed to load settings");
                None
            }
        }
    }

    /// Replace the whole settings blob
    pub async fn save_settings(&self, settings: &RandomizerSettings) -> bool {
        let key = self.settings_key.clone();
        self.write(&key, &settings.to_value()).await
    }

    /// Read-modify-write against the latest blob.
    ///
    /// Returns the written blob, or `None` when either the fetch or the write
    /// failed. A failed fetch never falls back to writing a partial blob.
    pub async fn modify_settings<F>(&self, apply: F) -> Option<RandomizerSettings>
    where
        F: FnOnce(RandomizerSettings) -> RandomizerSettings,
    {
        let latest = self.load_settings().await?;
        let next = apply(latest);
        if self.save_settings(&next).await {
            debug!(key = %self.settings_key, "Settings blob updated");
            Some(next)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;
    use serde_json::json;

    fn gateway_with(store: Arc<MemoryKeyValueStore>) -> PersistenceGateway {
        PersistenceGateway::new(store)
    }

    #[tokio::test]
    async fn test_missing_blob_loads_empty() {
        let gateway = gateway_with(Arc::new(MemoryKeyValueStore::new()));
        assert_eq!(gateway.load_settings().await, Some(RandomizerSettings::default()));
        assert_eq!(gateway.read::<Vec<String>>("nothing").await, None);
    }

    #[tokio::test]
    async fn test_modify_applies_to_latest() {
        let store = Arc::new(MemoryKeyValueStore::with_value(
            SETTINGS_KEY,
            json!({ "t2": ["x"] }),
        ));
        let gateway = gateway_with(store.clone());

        let written = gateway
            .modify_settings(|s| s.with_selection("t1", vec!["a".to_string()]))
            .await
            .unwrap();
        assert_eq!(written.selection_for("t2"), Some(vec!["x".to_string()]));

        let raw = store.snapshot(SETTINGS_KEY).unwrap();
        assert_eq!(raw["t1"], json!(["a"]));
        assert_eq!(raw["t2"], json!(["x"]));
    }

    #[tokio::test]
    async fn test_progress_write_keeps_malformed_parts() {
        let stored = json!({
            "t2": ["x", "y"],
            "_customMembers": { "t9": [{ "identity": { "id": "z" } }] },
            "_randomizerData": {
                "10152026": { "teamMembers": { "t1": ["a", 1] }, "hotd": "Old day" }
            }
        });
        let store = Arc::new(MemoryKeyValueStore::with_value(SETTINGS_KEY, stored.clone()));
        let gateway = gateway_with(store.clone());

        let loaded = gateway.load_settings().await.unwrap();
        assert_eq!(loaded.selection_for("t2"), Some(vec!["x".to_string(), "y".to_string()]));

        gateway
            .modify_settings(|s| {
                s.update_day("10162026", |day| day.with_team_progress("t1", vec![], Some("a".to_string())))
            })
            .await
            .unwrap();

        let raw = store.snapshot(SETTINGS_KEY).unwrap();
        assert_eq!(raw["t2"], stored["t2"]);
        assert_eq!(raw["_customMembers"], stored["_customMembers"]);
        assert_eq!(raw["_randomizerData"]["10152026"], stored["_randomizerData"]["10152026"]);
        assert_eq!(raw["_randomizerData"]["10162026"]["activeMembers"]["t1"], "a");
    }

    #[tokio::test]
    async fn test_failures_are_converted() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let gateway = gateway_with(store.clone());

        store.set_fail_writes(true);
        assert!(!gateway.write("k", &json!(1)).await);
        assert!(gateway.modify_settings(|s| s).await.is_none());

        store.set_fail_writes(false);
        store.set_fail_reads(true);
        assert!(gateway.load_settings().await.is_none());
        assert!(gateway.modify_settings(|s| s).await.is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_typed_read_of_wrong_shape() {
        let store = Arc::new(MemoryKeyValueStore::with_value("k", json!("text")));
        let gateway = gateway_with(store);
        assert_eq!(gateway.read::<Vec<String>>("k").await, None);
        assert_eq!(gateway.read::<String>("k").await.as_deref(), Some("text"));
    }
}
