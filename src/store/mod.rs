// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Document store abstraction.
//!
//! Collections hold JSON objects keyed by opaque string ids. Writes are merges:
//! `upsert` creates the document when absent and otherwise merges the given
//! fields into it, recursing into nested objects and replacing everything else.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type Fields = serde_json::Map<String, Value>;

/// Collection names used across the application
pub mod collections {
    pub const PLAYERS: &str = "players";
    pub const PLAYER: &str = "player";
    pub const USERS: &str = "users";
    pub const SUBSCRIPTIONS: &str = "subscriptions";
    pub const SUBSCRIPTION_PLANS: &str = "subscription_plans";
    pub const CLUBS: &str = "clubs";
    pub const ACADEMIES: &str = "academies";
    pub const TRAINERS: &str = "trainers";
    pub const AGENTS: &str = "agents";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A stored document and its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self { id: id.into(), data }
    }

    /// Trimmed, non-empty string value of a field
    pub fn str_field(&self, key: &str) -> Option<&str> {
        non_empty_str(&self.data, key)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// Soft-deleted documents carry `isDeleted: true`
    pub fn is_deleted(&self) -> bool {
        self.bool_field("isDeleted") == Some(true)
    }
}

pub fn non_empty_str<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// One page of a collection scan, ordered by document id
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub limit: usize,
    pub start_after: Option<String>,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self {
            limit,
            start_after: None,
        }
    }

    pub fn after(limit: usize, id: impl Into<String>) -> Self {
        Self {
            limit,
            start_after: Some(id.into()),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merge `fields` into the document, creating it when absent
    async fn upsert(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Insert a new document under a store-assigned id
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Merge `fields` into an existing document. Fails with `NotFound` when absent.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn list(&self, collection: &str, page: PageRequest) -> Result<Vec<Document>, StoreError>;
}

/// Look a document up in each collection in turn, returning the first hit
/// together with the collection it came from.
pub async fn find_in_collections(
    store: &dyn DocumentStore,
    collections: &[&str],
    id: &str,
) -> Result<Option<(String, Document)>, StoreError> {
    for collection in collections {
        if let Some(doc) = store.get(collection, id).await? {
            return Ok(Some((collection.to_string(), doc)));
        }
    }
    Ok(None)
}

/// Merge `patch` into `target`: nested objects merge recursively, any other
/// value (arrays included) replaces the existing one.
pub fn merge_fields(target: &mut Fields, patch: Fields) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_fields(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Serialize a value into document fields
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Malformed(format!(
            "expected an object, got {}",
            other
        ))),
        Err(e) => Err(StoreError::Malformed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn merge_recurses_into_objects_and_replaces_arrays() {
        let mut target = fields(json!({
            "full_name": "Ali",
            "official_contact": { "name": "Coach", "phone": "123" },
            "videos": [{ "url": "a" }, { "url": "b" }]
        }));
        merge_fields(
            &mut target,
            fields(json!({
                "official_contact": { "phone": "456" },
                "videos": [{ "url": "c" }],
                "city": "جدة"
            })),
        );

        assert_eq!(target["full_name"], "Ali");
        assert_eq!(target["official_contact"], json!({ "name": "Coach", "phone": "456" }));
        assert_eq!(target["videos"], json!([{ "url": "c" }]));
        assert_eq!(target["city"], "جدة");
    }

    #[test]
    fn document_string_fields_ignore_blank_values() {
        let doc = Document::new("p1", fields(json!({ "name": "  ", "city": " الرياض ", "isDeleted": true })));
        assert_eq!(doc.str_field("name"), None);
        assert_eq!(doc.str_field("city"), Some("الرياض"));
        assert!(doc.is_deleted());
    }

    #[tokio::test]
    async fn lookup_falls_through_collections_in_order() {
        let store = MemoryStore::new();
        store
            .upsert(collections::PLAYER, "p1", fields(json!({ "full_name": "From player" })))
            .await
            .unwrap();

        let found = find_in_collections(
            &store,
            &[collections::PLAYERS, collections::USERS, collections::PLAYER],
            "p1",
        )
        .await
        .unwrap();

        let (collection, doc) = found.expect("document should be found");
        assert_eq!(collection, collections::PLAYER);
        assert_eq!(doc.str_field("full_name"), Some("From player"));
    }
}
