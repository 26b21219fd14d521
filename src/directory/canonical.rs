// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Rewrites legacy player documents to the canonical field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::image::{stored_image, IMAGE_FIELDS};
use crate::metrics::{outcome, PLAYER_WRITES};
use crate::models::OrganizationKind;
use crate::store::{collections, find_in_collections, non_empty_str, DocumentStore, Fields, StoreError};

/// What a canonicalization pass changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalReport {
    pub collection: String,
    /// Canonical keys written by this pass
    pub written: Vec<String>,
}

/// Patch that brings a document to the canonical schema. Legacy keys are left
/// in place so older readers keep working.
pub fn canonicalize_fields(fields: &Fields) -> Fields {
    let mut patch = Fields::new();

    for kind in OrganizationKind::ALL {
        if non_empty_str(fields, kind.id_field()).is_some() {
            continue;
        }
        if let Some(id) = non_empty_str(fields, kind.legacy_id_field()) {
            patch.insert(kind.id_field().to_string(), Value::String(id.to_string()));
        }
    }

    let canonical_image = IMAGE_FIELDS[0];
    let has_canonical_image = fields
        .get(canonical_image)
        .and_then(Value::as_str)
        .is_some_and(super::image::is_well_formed);
    if !has_canonical_image {
        if let Some(url) = stored_image(fields) {
            patch.insert(canonical_image.to_string(), Value::String(url.to_string()));
        }
    }

    patch
}

/// Canonicalize one stored player, wherever it lives
pub async fn canonicalize_player(store: &dyn DocumentStore, id: &str) -> Result<CanonicalReport, StoreError> {
    let sources = [collections::PLAYERS, collections::USERS, collections::PLAYER];
    let Some((collection, doc)) = find_in_collections(store, &sources, id).await? else {
        return Err(StoreError::NotFound {
            collection: collections::PLAYERS.to_string(),
            id: id.to_string(),
        });
    };

    let patch = canonicalize_fields(&doc.data);
    let written: Vec<String> = patch.keys().cloned().collect();

    if !patch.is_empty() {
        let result = store.update(&collection, id, patch).await;
        PLAYER_WRITES
            .with_label_values(&["canonicalize", outcome(&result)])
            .inc();
        result?;
        info!(%id, %collection, ?written, "Canonicalized player document");
    }

    Ok(CanonicalReport { collection, written })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn copies_legacy_keys_to_canonical_ones() {
        let patch = canonicalize_fields(&fields(json!({
            "clubId": "c1",
            "agent_id": "g1",
            "agentId": "old",
            "profile_image_url": "undefined",
            "photoURL": "https://cdn.test/p.png"
        })));

        assert_eq!(patch.get("club_id"), Some(&json!("c1")));
        assert!(patch.get("agent_id").is_none());
        assert_eq!(patch.get("profile_image_url"), Some(&json!("https://cdn.test/p.png")));
    }

    #[test]
    fn canonical_documents_need_no_patch() {
        let patch = canonicalize_fields(&fields(json!({
            "academy_id": "a1",
            "profile_image_url": "https://cdn.test/p.png"
        })));
        assert!(patch.is_empty());
    }

    #[tokio::test]
    async fn rewrites_the_stored_copy() {
        let store = MemoryStore::new();
        store
            .upsert(collections::PLAYER, "p1", fields(json!({ "trainerId": "t1" })))
            .await
            .unwrap();

        let report = canonicalize_player(&store, "p1").await.unwrap();
        assert_eq!(report.collection, collections::PLAYER);
        assert_eq!(report.written, ["trainer_id"]);

        let doc = store.get(collections::PLAYER, "p1").await.unwrap().unwrap();
        assert_eq!(doc.data["trainer_id"], "t1");
        assert_eq!(doc.data["trainerId"], "t1");
    }

    #[tokio::test]
    async fn missing_player_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            canonicalize_player(&store, "ghost").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
