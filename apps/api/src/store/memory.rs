use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, Filter, StoreError};

/// In-process document store for tests. Keeps insertion order per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    offline: AtomicBool,
}

/// Evaluates a filter the way JSONB containment would for top-level fields.
fn filter_matches(filter: &Filter, data: &Map<String, Value>) -> bool {
    match filter {
        Filter::Eq(field, value) => data.get(*field) == Some(value),
        Filter::Contains(field, value) => data
            .get(*field)
            .and_then(Value::as_array)
            .is_some_and(|items| items.contains(value)),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the backend were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collections(&self) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        for collection in Collection::ALL {
            collections.entry(collection).or_default();
        }
        Ok(())
    }

    async fn insert(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<String, StoreError> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(Document {
                id: id.clone(),
                data,
            });
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.check_online()?;
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn merge(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => doc.data.extend(fields),
            None => docs.push(Document {
                id: id.to_string(),
                data: fields,
            }),
        }
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id));
        match doc {
            Some(doc) => {
                doc.data.extend(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        self.check_online()?;
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filters.iter().all(|f| filter_matches(f, &d.data)))
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

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_filter_matches() {
        let data = json!({"uid": "u1", "tags": ["rust", "go"]});
        let data = data.as_object().unwrap();
        assert!(filter_matches(&Filter::Eq("uid", json!("u1")), data));
        assert!(!filter_matches(&Filter::Eq("uid", json!("u2")), data));
        assert!(filter_matches(&Filter::Contains("tags", json!("go")), data));
        assert!(!filter_matches(&Filter::Contains("tags", json!("java")), data));
        assert!(!filter_matches(&Filter::Contains("uid", json!("u1")), data));
    }

    #[tokio::test]
    async fn test_merge_keeps_unspecified_fields() {
        let store = MemoryStore::new();
        store
            .merge(Collection::Profiles, "u1", object(json!({"summary": "SRE"})))
            .await
            .unwrap();
        store
            .merge(Collection::Profiles, "u1", object(json!({"location": "Oslo"})))
            .await
            .unwrap();
        let doc = store.get(Collection::Profiles, "u1").await.unwrap().unwrap();
        assert_eq!(Value::Object(doc.data), json!({"summary": "SRE", "location": "Oslo"}));
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let store = MemoryStore::new();
        let updated = store
            .update(Collection::Applications, "nope", Map::new())
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_offline_is_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.query(Collection::Jobs, &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
