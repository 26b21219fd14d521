// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Read-only projection of a stored player profile.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::affiliation::{affiliation_of, resolve_organization, Affiliation};
use crate::age::display_age;
use crate::directory::image::resolve_image;
use crate::models::{OrganizationSummary, PlayerProfile};
use crate::storage::ObjectStorage;
use crate::store::{collections, find_in_collections, non_empty_str, DocumentStore, Fields, StoreError};

/// Shown instead of a contact number the viewer may not see
pub const MASKED_CONTACT: &str = "محجوب";

/// Collections that may hold a player profile, in lookup order
pub const PROFILE_SOURCES: [&str; 3] = [collections::PLAYERS, collections::USERS, collections::PLAYER];

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("player {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Who is looking at a profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub id: Option<String>,
    /// Organization the viewer acts for, if any
    pub organization_id: Option<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Contact numbers are visible to the player and to the organization the
    /// player is affiliated with.
    pub fn can_see_contact(&self, player_id: &str, affiliation: &Affiliation) -> bool {
        if self.id.as_deref() == Some(player_id) {
            return true;
        }
        match (self.organization_id.as_deref(), affiliation.id()) {
            (Some(viewer_org), Some(affiliated)) => viewer_org == affiliated,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: String,
    /// Collection the profile was read from
    pub collection: String,
    pub profile: PlayerProfile,
    pub age: Option<u32>,
    pub image: String,
    pub affiliation: Affiliation,
    pub organization: Option<OrganizationSummary>,
    pub contact_visible: bool,
    pub is_deleted: bool,
}

fn mask(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        *value = Some(MASKED_CONTACT.to_string());
    }
}

/// Mask contact numbers in raw document fields, for listings that have no
/// single viewer to check against
pub fn mask_contact_fields(fields: &mut Fields) {
    for key in ["phone", "whatsapp"] {
        if non_empty_str(fields, key).is_some() {
            fields.insert(key.to_string(), Value::String(MASKED_CONTACT.to_string()));
        }
    }
}

/// Load a profile for display.
///
/// The document is looked up in `players`, then `users`, then `player`.
/// Soft-deleted profiles still render and are flagged.
pub async fn view_player(
    store: &dyn DocumentStore,
    storage: &dyn ObjectStorage,
    player_id: &str,
    viewer: &Viewer,
    today: NaiveDate,
) -> Result<PlayerView, ViewError> {
    let (collection, doc) = find_in_collections(store, &PROFILE_SOURCES, player_id)
        .await?
        .ok_or_else(|| ViewError::NotFound(player_id.to_string()))?;
    debug!(%player_id, %collection, "Loaded player profile");

    let affiliation = affiliation_of(&doc.data);
    let organization = resolve_organization(store, &affiliation).await?;
    let image = resolve_image(storage, player_id, &doc.data).await;

    let mut profile = PlayerProfile::from_fields(doc.id, doc.data);
    let age = display_age(profile.birth_date.as_ref(), today);
    let contact_visible = viewer.can_see_contact(player_id, &affiliation);
    if !contact_visible {
        mask(&mut profile.phone);
        mask(&mut profile.whatsapp);
    }

    Ok(PlayerView {
        id: player_id.to_string(),
        collection,
        is_deleted: profile.is_deleted(),
        profile,
        age,
        image,
        affiliation,
        organization,
        contact_visible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStorage;
    use crate::store::{Fields, MemoryStore};
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    async fn store_with_player() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert(
                collections::USERS,
                "p1",
                fields(json!({
                    "full_name": "Yousef",
                    "birth_date": "2030-02-01",
                    "phone": "+966500000000",
                    "whatsapp": "+966500000001",
                    "clubId": "c1",
                    "isDeleted": true
                })),
            )
            .await
            .unwrap();
        store
            .upsert(collections::CLUBS, "c1", fields(json!({ "club_name": "الاتحاد" })))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn strangers_see_masked_contacts() {
        let store = store_with_player().await;
        let storage = MemoryObjectStorage::new("https://files.test");

        let view = view_player(&store, &storage, "p1", &Viewer::anonymous(), today())
            .await
            .unwrap();

        assert_eq!(view.collection, collections::USERS);
        assert_eq!(view.profile.phone.as_deref(), Some(MASKED_CONTACT));
        assert_eq!(view.profile.whatsapp.as_deref(), Some(MASKED_CONTACT));
        assert!(!view.contact_visible);
        assert_eq!(view.age, Some(crate::age::FALLBACK_AGE));
        assert!(view.is_deleted);
        assert_eq!(
            view.organization.and_then(|o| o.name).as_deref(),
            Some("الاتحاد")
        );
    }

    #[tokio::test]
    async fn owner_and_affiliated_organization_see_contacts() {
        let store = store_with_player().await;
        let storage = MemoryObjectStorage::new("https://files.test");

        let owner = Viewer {
            id: Some("p1".into()),
            organization_id: None,
        };
        let view = view_player(&store, &storage, "p1", &owner, today()).await.unwrap();
        assert_eq!(view.profile.phone.as_deref(), Some("+966500000000"));

        let club = Viewer {
            id: Some("someone".into()),
            organization_id: Some("c1".into()),
        };
        let view = view_player(&store, &storage, "p1", &club, today()).await.unwrap();
        assert!(view.contact_visible);

        let rival = Viewer {
            id: Some("someone".into()),
            organization_id: Some("c2".into()),
        };
        let view = view_player(&store, &storage, "p1", &rival, today()).await.unwrap();
        assert!(!view.contact_visible);
    }

    #[tokio::test]
    async fn unknown_player_is_not_found() {
        let store = MemoryStore::new();
        let storage = MemoryObjectStorage::new("https://files.test");
        let result = view_player(&store, &storage, "ghost", &Viewer::anonymous(), today()).await;
        assert!(matches!(result, Err(ViewError::NotFound(id)) if id == "ghost"));
    }

    #[test]
    fn independent_players_only_show_contacts_to_themselves() {
        let viewer = Viewer {
            id: None,
            organization_id: Some("c1".into()),
        };
        assert!(!viewer.can_see_contact("p1", &Affiliation::Independent));
    }
}
