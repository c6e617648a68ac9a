//! In-memory statistics store

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use super::{Namespace, StatsStore};
use crate::error::{FilterError, Result};

/// In-memory [`StatsStore`] backend.
///
/// Holds everything in a single map keyed by `namespace:key`. Suitable for
/// tests and single-process use; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn full_key(ns: Namespace, key: &str) -> String {
        format!("{ns}:{key}")
    }

    async fn bump(&self, ns: Namespace, key: &str, delta: i64) -> Result<i64> {
        let mut entries = self.entries.write().await;
        let slot = entries
            .entry(Self::full_key(ns, key))
            .or_insert_with(|| Value::from(0));

        let current = slot.as_i64().ok_or_else(|| {
            FilterError::DataCorruption(format!("counter '{ns}:{key}' is not an integer: {slot}"))
        })?;
        let next = current + delta;
        *slot = Value::from(next);

        Ok(next)
    }
}

#[async_trait::async_trait]
impl StatsStore for MemoryStore {
    async fn incr(&self, ns: Namespace, key: &str) -> Result<i64> {
        self.bump(ns, key, 1).await
    }

    async fn decr(&self, ns: Namespace, key: &str) -> Result<i64> {
        self.bump(ns, key, -1).await
    }

    async fn read(&self, ns: Namespace, key: &str) -> Result<Value> {
        let entries = self.entries.read().await;

        entries
            .get(&Self::full_key(ns, key))
            .cloned()
            .ok_or_else(|| FilterError::NotFound {
                namespace: ns.as_str().to_string(),
                key: key.to_string(),
            })
    }

    async fn read_all(&self, ns: Namespace, keys: &[String]) -> Result<HashMap<String, Value>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let entries = self.entries.read().await;
        let mut found = HashMap::new();

        for key in keys {
            if let Some(value) = entries.get(&Self::full_key(ns, key)) {
                found.insert(key.clone(), value.clone());
            }
        }

        Ok(found)
    }

    async fn update(&self, ns: Namespace, key: &str, value: &Value) -> Result<()> {
        let mut entries = self.entries.write().await;

        match entries.get_mut(&Self::full_key(ns, key)) {
            Some(slot) => {
                *slot = value.clone();
                Ok(())
            }
            None => Err(FilterError::NotFound {
                namespace: ns.as_str().to_string(),
                key: key.to_string(),
            }),
        }
    }

    async fn create(&self, ns: Namespace, key: &str, value: &Value) -> Result<()> {
        let mut entries = self.entries.write().await;

        match entries.entry(Self::full_key(ns, key)) {
            Entry::Occupied(_) => Err(FilterError::AlreadyExists {
                namespace: ns.as_str().to_string(),
                key: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(value.clone());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_incr_unseen_key_starts_at_zero() {
        let store = MemoryStore::new();

        assert_eq!(store.incr(Namespace::Spam, "token").await.unwrap(), 1);
        assert_eq!(store.incr(Namespace::Spam, "token").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_decr_unseen_key_goes_negative() {
        let store = MemoryStore::new();

        assert_eq!(store.decr(Namespace::Ham, "token").await.unwrap(), -1);
        assert_eq!(store.decr(Namespace::Ham, "token").await.unwrap(), -2);
    }

    #[tokio::test]
    async fn test_namespaces_do_not_collide() {
        let store = MemoryStore::new();

        store.incr(Namespace::Spam, "token").await.unwrap();
        let err = store.read(Namespace::Ham, "token").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_all_only_returns_found_keys() {
        let store = MemoryStore::new();
        store.incr(Namespace::Prob, "a").await.unwrap();

        let keys = vec!["a".to_string(), "missing".to_string()];
        let found = store.read_all(Namespace::Prob, &keys).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found.get("a"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_read_all_empty_keys_is_empty() {
        let store = MemoryStore::new();
        assert!(store.read_all(Namespace::Prob, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_existing_key_fails() {
        let store = MemoryStore::new();
        store
            .create(Namespace::TrainRec, "hash", &json!({ "cat": "spam" }))
            .await
            .unwrap();

        let err = store
            .create(Namespace::TrainRec, "hash", &json!({ "cat": "ham" }))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_update_absent_key_fails() {
        let store = MemoryStore::new();

        let err = store
            .update(Namespace::Prob, "token", &json!(0.5))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_creates_then_overwrites() {
        let store = MemoryStore::new();

        store.save(Namespace::Prob, "token", &json!(0.4)).await.unwrap();
        assert_eq!(store.read(Namespace::Prob, "token").await.unwrap(), json!(0.4));

        store.save(Namespace::Prob, "token", &json!(0.9)).await.unwrap();
        assert_eq!(store.read(Namespace::Prob, "token").await.unwrap(), json!(0.9));
    }

    #[tokio::test]
    async fn test_incr_non_integer_is_corruption() {
        let store = MemoryStore::new();
        store
            .create(Namespace::Spam, "token", &json!("not a number"))
            .await
            .unwrap();

        let err = store.incr(Namespace::Spam, "token").await.unwrap_err();
        assert!(matches!(err, FilterError::DataCorruption(_)));
    }
}
