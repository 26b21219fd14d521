// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Which organization, if any, a player document belongs to.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::image::candidate_url;
use crate::models::{OrganizationKind, OrganizationSummary};
use crate::store::{non_empty_str, DocumentStore, Fields, StoreError};

/// Name fields seen on organization documents, in probe order
const NAME_FIELDS: [&str; 16] = [
    "name",
    "full_name",
    "club_name",
    "academy_name",
    "trainer_name",
    "agent_name",
    "organization_name",
    "business_name",
    "company_name",
    "title",
    "display_name",
    "brand_name",
    "academyName",
    "clubName",
    "trainerName",
    "agentName",
];

/// Image fields seen on organization documents, in probe order
const IMAGE_FIELDS: [&str; 14] = [
    "profile_image",
    "logo",
    "image",
    "avatar",
    "photo",
    "picture",
    "profile_picture",
    "profile_photo",
    "business_logo",
    "brand_logo",
    "academy_logo",
    "club_logo",
    "trainer_photo",
    "agent_photo",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Affiliation {
    Organization { kind: OrganizationKind, id: String },
    Independent,
}

impl Affiliation {
    pub fn kind(&self) -> Option<OrganizationKind> {
        match self {
            Affiliation::Organization { kind, .. } => Some(*kind),
            Affiliation::Independent => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Affiliation::Organization { id, .. } => Some(id),
            Affiliation::Independent => None,
        }
    }

    pub fn is_independent(&self) -> bool {
        matches!(self, Affiliation::Independent)
    }
}

/// Affiliation of a stored player document.
///
/// Kinds are checked club, academy, trainer, agent; within a kind the
/// snake_case key wins over the legacy camelCase one. A document with none
/// of them is independent.
pub fn affiliation_of(fields: &Fields) -> Affiliation {
    for kind in OrganizationKind::ALL {
        let id = non_empty_str(fields, kind.id_field())
            .or_else(|| non_empty_str(fields, kind.legacy_id_field()));
        if let Some(id) = id {
            return Affiliation::Organization {
                kind,
                id: id.to_string(),
            };
        }
    }
    Affiliation::Independent
}

/// Display name of an organization document
pub fn organization_name(fields: &Fields) -> Option<String> {
    if let Some(name) = NAME_FIELDS.iter().find_map(|key| non_empty_str(fields, key)) {
        return Some(name.to_string());
    }

    let first = non_empty_str(fields, "first_name");
    let last = non_empty_str(fields, "last_name");
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
        (None, None) => None,
    }
}

/// Logo or photo of an organization document
pub fn organization_image(fields: &Fields) -> Option<String> {
    IMAGE_FIELDS
        .iter()
        .filter_map(|key| fields.get(*key))
        .find_map(candidate_url)
        .map(str::to_string)
}

/// Load the organization a player is affiliated with.
///
/// Independent players resolve to `None`. A `users` document only counts when
/// its `accountType`, if present, matches the affiliation kind.
pub async fn resolve_organization(
    store: &dyn DocumentStore,
    affiliation: &Affiliation,
) -> Result<Option<OrganizationSummary>, StoreError> {
    let Affiliation::Organization { kind, id } = affiliation else {
        return Ok(None);
    };

    for collection in kind.collections() {
        let Some(doc) = store.get(collection, id).await? else {
            continue;
        };

        if collection == crate::store::collections::USERS {
            if let Some(account_type) = doc.str_field("accountType") {
                if account_type != kind.as_str() {
                    debug!(%id, %account_type, "Skipping users document of another account type");
                    continue;
                }
            }
        }

        return Ok(Some(OrganizationSummary {
            id: id.clone(),
            kind: *kind,
            name: organization_name(&doc.data),
            image: organization_image(&doc.data),
            is_deleted: doc.is_deleted(),
            collection: collection.to_string(),
        }));
    }

    debug!(%id, kind = %kind, "Affiliated organization not found");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{collections, MemoryStore};
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn no_affiliation_means_independent() {
        let affiliation = affiliation_of(&fields(json!({ "full_name": "Ali", "club_id": "  " })));
        assert!(affiliation.is_independent());
        assert_eq!(affiliation.id(), None);
    }

    #[test]
    fn club_beats_academy_and_snake_case_beats_camel_case() {
        let affiliation = affiliation_of(&fields(json!({
            "academy_id": "a1",
            "clubId": "legacy",
            "club_id": "c1"
        })));
        assert_eq!(
            affiliation,
            Affiliation::Organization {
                kind: OrganizationKind::Club,
                id: "c1".into()
            }
        );

        let legacy = affiliation_of(&fields(json!({ "agentId": "g7" })));
        assert_eq!(legacy.kind(), Some(OrganizationKind::Agent));
        assert_eq!(legacy.id(), Some("g7"));
    }

    #[test]
    fn names_fall_back_to_person_names() {
        assert_eq!(
            organization_name(&fields(json!({ "name": "", "academy_name": "النجوم" }))),
            Some("النجوم".into())
        );
        assert_eq!(
            organization_name(&fields(json!({ "first_name": "Sami", "last_name": "Haddad" }))),
            Some("Sami Haddad".into())
        );
        assert_eq!(organization_name(&fields(json!({}))), None);
    }

    #[test]
    fn images_accept_url_objects() {
        let image = organization_image(&fields(json!({
            "logo": { "url": "https://cdn.test/logo.png" },
            "avatar": "https://cdn.test/avatar.png"
        })));
        assert_eq!(image.as_deref(), Some("https://cdn.test/logo.png"));
    }

    #[tokio::test]
    async fn users_document_must_match_account_type() {
        let store = MemoryStore::new();
        store
            .upsert(collections::USERS, "o1", fields(json!({ "accountType": "academy", "name": "Wrong" })))
            .await
            .unwrap();

        let club = Affiliation::Organization {
            kind: OrganizationKind::Club,
            id: "o1".into(),
        };
        assert_eq!(resolve_organization(&store, &club).await.unwrap(), None);

        let academy = Affiliation::Organization {
            kind: OrganizationKind::Academy,
            id: "o1".into(),
        };
        let org = resolve_organization(&store, &academy).await.unwrap().unwrap();
        assert_eq!(org.name.as_deref(), Some("Wrong"));
        assert_eq!(org.collection, collections::USERS);
    }

    #[tokio::test]
    async fn dedicated_collection_wins() {
        let store = MemoryStore::new();
        store
            .upsert(collections::CLUBS, "c1", fields(json!({ "club_name": "الهلال", "isDeleted": true })))
            .await
            .unwrap();
        store
            .upsert(collections::USERS, "c1", fields(json!({ "name": "shadow" })))
            .await
            .unwrap();

        let affiliation = Affiliation::Organization {
            kind: OrganizationKind::Club,
            id: "c1".into(),
        };
        let org = resolve_organization(&store, &affiliation).await.unwrap().unwrap();
        assert_eq!(org.name.as_deref(), Some("الهلال"));
        assert!(org.is_deleted);
        assert_eq!(org.collection, collections::CLUBS);
    }

    #[tokio::test]
    async fn independent_players_have_no_organization() {
        let store = MemoryStore::new();
        assert_eq!(
            resolve_organization(&store, &Affiliation::Independent).await.unwrap(),
            None
        );
    }
}
