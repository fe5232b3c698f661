use std::collections::HashMap;
use std::sync::RwLock;

use super::r#trait::{ItemStore, StoreError, StoredItem};

/// In-memory item store.
///
/// Intended for tests/dev. Tables materialize on first write (the store is
/// schemaless), and `query` emulates a secondary index by filtering on a
/// string attribute of the payload.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    tables: RwLock<HashMap<String, HashMap<String, StoredItem>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl core::fmt::Debug) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl ItemStore for InMemoryItemStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<StoredItem>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.get(table).and_then(|t| t.get(key)).cloned())
    }

    fn put(&self, table: &str, mut item: StoredItem) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.entry(table.to_string()).or_default();
        let current = table.get(&item.key).map(|i| i.version).unwrap_or(0);
        item.version = current + 1;
        table.insert(item.key.clone(), item);
        Ok(())
    }

    fn put_if_version(
        &self,
        table: &str,
        mut item: StoredItem,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.entry(table.to_string()).or_default();
        let current = table.get(&item.key).map(|i| i.version).unwrap_or(0);
        if current != expected_version {
            return Err(StoreError::ConditionFailed);
        }
        item.version = current + 1;
        table.insert(item.key.clone(), item);
        Ok(())
    }

    fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if let Some(t) = tables.get_mut(table) {
            t.remove(key);
        }
        Ok(())
    }

    fn scan(&self, table: &str) -> Result<Vec<StoredItem>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    fn query(
        &self,
        table: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<StoredItem>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .get(table)
            .map(|t| {
                t.values()
                    .filter(|item| {
                        item.payload.get(attribute).and_then(|v| v.as_str()) == Some(value)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(key: &str, payload: serde_json::Value) -> StoredItem {
        StoredItem {
            key: key.to_string(),
            version: 0,
            payload,
        }
    }

    #[test]
    fn put_then_get_round_trips_and_versions() {
        let store = InMemoryItemStore::new();
        store.put("t", item("a", json!({"x": 1}))).unwrap();
        let got = store.get("t", "a").unwrap().unwrap();
        assert_eq!(got.version, 1);
        assert_eq!(got.payload, json!({"x": 1}));

        store.put("t", item("a", json!({"x": 2}))).unwrap();
        assert_eq!(store.get("t", "a").unwrap().unwrap().version, 2);
    }

    #[test]
    fn get_absent_is_none_not_error() {
        let store = InMemoryItemStore::new();
        assert!(store.get("t", "missing").unwrap().is_none());
    }

    #[test]
    fn conditional_put_rejects_stale_version() {
        let store = InMemoryItemStore::new();
        store.put("t", item("a", json!({"x": 1}))).unwrap();

        // Stale expectation: item is at version 1.
        let err = store
            .put_if_version("t", item("a", json!({"x": 2})), 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::ConditionFailed));
        assert_eq!(store.get("t", "a").unwrap().unwrap().payload, json!({"x": 1}));

        store
            .put_if_version("t", item("a", json!({"x": 2})), 1)
            .unwrap();
        assert_eq!(store.get("t", "a").unwrap().unwrap().version, 2);
    }

    #[test]
    fn conditional_put_creates_when_expecting_absent() {
        let store = InMemoryItemStore::new();
        store
            .put_if_version("t", item("a", json!({"x": 1})), 0)
            .unwrap();
        assert_eq!(store.get("t", "a").unwrap().unwrap().version, 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = InMemoryItemStore::new();
        store.put("t", item("a", json!({}))).unwrap();
        store.delete("t", "a").unwrap();
        store.delete("t", "a").unwrap();
        assert!(store.get("t", "a").unwrap().is_none());
    }

    #[test]
    fn scan_returns_all_items_in_table() {
        let store = InMemoryItemStore::new();
        store.put("t", item("a", json!({"n": 1}))).unwrap();
        store.put("t", item("b", json!({"n": 2}))).unwrap();
        store.put("other", item("c", json!({"n": 3}))).unwrap();

        let mut keys: Vec<String> = store.scan("t").unwrap().into_iter().map(|i| i.key).collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(store.scan("empty").unwrap().is_empty());
    }

    #[test]
    fn query_filters_on_payload_attribute() {
        let store = InMemoryItemStore::new();
        store
            .put("t", item("a", json!({"category": "Electronics"})))
            .unwrap();
        store
            .put("t", item("b", json!({"category": "Tools"})))
            .unwrap();
        store.put("t", item("c", json!({"other": true}))).unwrap();

        let hits = store.query("t", "category", "Electronics").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "a");
    }
}
