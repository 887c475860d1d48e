//! Best-effort local mirror of server-held entity lists.
//!
//! Each key holds one JSON-encoded list, mimicking the durable key-value
//! storage the workflow mirrors into. Reads are tolerant: a missing or
//! corrupt entry yields an empty list, never an error.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// In-process mirror keyed by entity type.
#[derive(Debug, Default)]
pub struct MirrorStore {
    entries: DashMap<String, String>,
}

impl MirrorStore {
    /// Create an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the list stored under `key`. Missing or unparseable entries
    /// yield an empty list.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.entries.get(key) else {
            return Vec::new();
        };
        match serde_json::from_str(raw.value()) {
            Ok(items) => items,
            Err(e) => {
                warn!(key, error = %e, "Discarding unparseable mirror entry");
                Vec::new()
            }
        }
    }

    /// Overwrite the list stored under `key`.
    pub fn replace<T: Serialize>(&self, key: &str, items: &[T]) {
        match serde_json::to_string(items) {
            Ok(raw) => {
                self.entries.insert(key.to_string(), raw);
            }
            Err(e) => warn!(key, error = %e, "Failed to encode mirror entry"),
        }
    }

    /// Insert or replace a single item, newest first. The existing item
    /// to replace is located with `matches`.
    pub fn upsert_front<T, F>(&self, key: &str, item: &T, matches: F)
    where
        T: Serialize + DeserializeOwned + Clone,
        F: Fn(&T) -> bool,
    {
        let mut items: Vec<T> = self.load(key);
        if let Some(existing) = items.iter_mut().find(|candidate| matches(candidate)) {
            *existing = item.clone();
        } else {
            items.insert(0, item.clone());
        }
        self.replace(key, &items);
    }

    /// Append a single item at the end (event-log order).
    pub fn push_back<T>(&self, key: &str, item: &T)
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let mut items: Vec<T> = self.load(key);
        items.push(item.clone());
        self.replace(key, &items);
    }

    /// Drop everything the mirror holds.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        value: i32,
    }

    fn row(id: &str, value: i32) -> Row {
        Row {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let mirror = MirrorStore::new();
        let items: Vec<Row> = mirror.load("nothing");
        assert!(items.is_empty());
    }

    #[test]
    fn test_replace_overwrites() {
        let mirror = MirrorStore::new();
        mirror.replace("rows", &[row("a", 1), row("b", 2)]);
        mirror.replace("rows", &[row("c", 3)]);
        let items: Vec<Row> = mirror.load("rows");
        assert_eq!(items, vec![row("c", 3)]);
    }

    #[test]
    fn test_upsert_front_inserts_new_items_first() {
        let mirror = MirrorStore::new();
        mirror.replace("rows", &[row("a", 1)]);
        mirror.upsert_front("rows", &row("b", 2), |r| r.id == "b");
        let items: Vec<Row> = mirror.load("rows");
        assert_eq!(items, vec![row("b", 2), row("a", 1)]);
    }

    #[test]
    fn test_upsert_front_replaces_in_place() {
        let mirror = MirrorStore::new();
        mirror.replace("rows", &[row("a", 1), row("b", 2)]);
        mirror.upsert_front("rows", &row("b", 9), |r| r.id == "b");
        let items: Vec<Row> = mirror.load("rows");
        assert_eq!(items, vec![row("a", 1), row("b", 9)]);
    }

    #[test]
    fn test_push_back_keeps_order() {
        let mirror = MirrorStore::new();
        mirror.push_back("log", &row("a", 1));
        mirror.push_back("log", &row("b", 2));
        let items: Vec<Row> = mirror.load("log");
        assert_eq!(items, vec![row("a", 1), row("b", 2)]);
    }
}
