// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use tokio::sync::RwLock;
use tracing::debug;

use super::{merge_fields, Document, DocumentStore, Fields, PageRequest, StoreError};

/// Process-local document store used for tests and single-node runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn upsert(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let doc = guard
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        merge_fields(doc, fields);
        debug!("Upserted {}/{}", collection, id);
        Ok(())
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        debug!("Created {}/{}", collection, id);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        match guard.get_mut(collection).and_then(|docs| docs.get_mut(id)) {
            Some(doc) => {
                merge_fields(doc, fields);
                Ok(())
            }
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        if let Some(docs) = guard.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str, page: PageRequest) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let Some(docs) = guard.get(collection) else {
            return Ok(Vec::new());
        };

        let lower = match &page.start_after {
            Some(id) => Bound::Excluded(id.clone()),
            None => Bound::Unbounded,
        };

        Ok(docs
            .range((lower, Bound::Unbounded))
            .take(page.limit)
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn update_requires_an_existing_document() {
        let store = MemoryStore::new();
        assert_err!(store.update("plans", "missing", Fields::new()).await);

        let id = store.create("plans", fields(json!({ "duration": 30 }))).await.unwrap();
        assert_ok!(store.update("plans", &id, fields(json!({ "duration": 90 }))).await);

        let doc = store.get("plans", &id).await.unwrap().unwrap();
        assert_eq!(doc.data["duration"], 90);
    }

    #[tokio::test]
    async fn list_pages_by_id_order() {
        let store = MemoryStore::new();
        for id in ["c", "a", "e", "b", "d"] {
            store.upsert("players", id, Fields::new()).await.unwrap();
        }

        let first = store.list("players", PageRequest::first(2)).await.unwrap();
        let ids: Vec<_> = first.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);

        let rest = store.list("players", PageRequest::after(10, "b")).await.unwrap();
        let ids: Vec<_> = rest.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["c", "d", "e"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.upsert("players", "p1", Fields::new()).await.unwrap();
        assert_ok!(store.delete("players", "p1").await);
        assert_ok!(store.delete("players", "p1").await);
        assert_eq!(store.count("players").await, 0);
    }
}
