// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Player directory: loads player documents from every collection that has
//! ever held them, merges copies of the same player, filters and pages.

pub mod canonical;
pub mod filter;
pub mod image;

pub use canonical::{canonicalize_fields, canonicalize_player, CanonicalReport};
pub use filter::{AccountKind, AgeBracket, DirectoryFilter};

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::affiliation::{affiliation_of, Affiliation};
use crate::age::display_age;
use crate::models::player::StoredDate;
use crate::storage::ObjectStorage;
use crate::store::{collections, non_empty_str, Document, DocumentStore, Fields, PageRequest, StoreError};
use crate::viewer::mask_contact_fields;

/// Which documents of a collection belong in the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceRule {
    NotDeleted,
    Everything,
    PlayerAccountsNotDeleted,
}

impl SourceRule {
    fn admits(self, doc: &Document) -> bool {
        match self {
            SourceRule::NotDeleted => !doc.is_deleted(),
            SourceRule::Everything => true,
            SourceRule::PlayerAccountsNotDeleted => {
                doc.str_field("accountType") == Some("player") && !doc.is_deleted()
            }
        }
    }
}

/// Collections read in order; later copies of a player override earlier ones
const SOURCES: [(&str, SourceRule); 3] = [
    (collections::PLAYERS, SourceRule::NotDeleted),
    (collections::PLAYER, SourceRule::Everything),
    (collections::USERS, SourceRule::PlayerAccountsNotDeleted),
];

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Fold a later copy of a player into the earlier one. Image fields keep the
/// first non-empty value seen; every other field takes the later non-empty
/// value.
pub fn merge_copies(target: &mut Fields, later: Fields) {
    for (key, value) in later {
        if is_empty_value(&value) {
            continue;
        }
        let is_image = image::IMAGE_FIELDS.contains(&key.as_str());
        let keep_existing = is_image && target.get(&key).is_some_and(|v| !is_empty_value(v));
        if !keep_existing {
            target.insert(key, value);
        }
    }
}

/// One player as listed in the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryPlayer {
    pub id: String,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub image: String,
    pub affiliation: Affiliation,
    pub data: Fields,
}

/// One page of directory results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryPage {
    pub players: Vec<DirectoryPlayer>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

fn player_age(fields: &Fields, today: NaiveDate) -> Option<u32> {
    let birth_date = fields
        .get("birth_date")
        .and_then(|v| serde_json::from_value::<StoredDate>(v.clone()).ok());
    display_age(birth_date.as_ref(), today).or_else(|| {
        fields
            .get("age")
            .and_then(Value::as_u64)
            .and_then(|age| u32::try_from(age).ok())
    })
}

fn player_name(fields: &Fields) -> Option<String> {
    ["full_name", "name", "displayName"]
        .iter()
        .find_map(|key| non_empty_str(fields, key))
        .map(str::to_string)
}

pub struct Directory {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    fetch_page_size: usize,
    page_size: usize,
}

impl Directory {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        fetch_page_size: usize,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            storage,
            fetch_page_size: fetch_page_size.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Read a whole collection page by page until a short page comes back
    async fn scan(&self, collection: &str, rule: SourceRule) -> Result<Vec<Document>, StoreError> {
        let mut admitted = Vec::new();
        let mut page = PageRequest::first(self.fetch_page_size);

        loop {
            let batch = self.store.list(collection, page.clone()).await?;
            let fetched = batch.len();
            let last_id = batch.last().map(|doc| doc.id.clone());

            admitted.extend(batch.into_iter().filter(|doc| rule.admits(doc)));

            match last_id {
                Some(id) if fetched == self.fetch_page_size => {
                    page = PageRequest::after(self.fetch_page_size, id);
                }
                _ => break,
            }
        }

        debug!("Loaded {} directory documents from {}", admitted.len(), collection);
        Ok(admitted)
    }

    /// Every listed player, one merged document per id, in first-seen order
    pub async fn load_players(&self) -> Result<Vec<Document>, StoreError> {
        let mut merged: Vec<Document> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (collection, rule) in SOURCES {
            for doc in self.scan(collection, rule).await? {
                match index.get(&doc.id) {
                    Some(&position) => merge_copies(&mut merged[position].data, doc.data),
                    None => {
                        index.insert(doc.id.clone(), merged.len());
                        merged.push(doc);
                    }
                }
            }
        }

        info!("Directory holds {} unique players", merged.len());
        Ok(merged)
    }

    /// Filter the directory and return one 1-based page. Images are resolved
    /// only for the players on the page.
    pub async fn search(&self, filter: &DirectoryFilter, page: usize) -> Result<DirectoryPage, StoreError> {
        let today = Utc::now().date_naive();
        let matching: Vec<(Document, Option<u32>)> = self
            .load_players()
            .await?
            .into_iter()
            .map(|doc| {
                let age = player_age(&doc.data, today);
                (doc, age)
            })
            .filter(|(doc, age)| filter.matches(&doc.data, *age))
            .collect();

        let total = matching.len();
        let total_pages = total.div_ceil(self.page_size);
        let page = page.max(1);
        let start = (page - 1).saturating_mul(self.page_size);

        let on_page: Vec<(Document, Option<u32>)> =
            matching.into_iter().skip(start).take(self.page_size).collect();
        let images = join_all(
            on_page
                .iter()
                .map(|(doc, _)| image::resolve_image(self.storage.as_ref(), &doc.id, &doc.data)),
        )
        .await;

        let players = on_page
            .into_iter()
            .zip(images)
            .map(|((doc, age), image)| {
                let mut data = doc.data;
                mask_contact_fields(&mut data);
                DirectoryPlayer {
                    name: player_name(&data),
                    affiliation: affiliation_of(&data),
                    id: doc.id,
                    age,
                    image,
                    data,
                }
            })
            .collect();

        Ok(DirectoryPage {
            players,
            page,
            page_size: self.page_size,
            total,
            total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStorage;
    use crate::store::MemoryStore;
    use crate::viewer::MASKED_CONTACT;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn merge_keeps_first_image_and_latest_text() {
        let mut target = fields(json!({
            "full_name": "Old",
            "profile_image_url": "https://cdn.test/first.png",
            "avatar": ""
        }));
        merge_copies(
            &mut target,
            fields(json!({
                "full_name": "New",
                "profile_image_url": "https://cdn.test/second.png",
                "avatar": "https://cdn.test/avatar.png",
                "city": ""
            })),
        );

        assert_eq!(target["full_name"], "New");
        assert_eq!(target["profile_image_url"], "https://cdn.test/first.png");
        assert_eq!(target["avatar"], "https://cdn.test/avatar.png");
        assert!(target.get("city").is_none());
    }

    async fn seeded() -> Directory {
        let store = Arc::new(MemoryStore::new());
        let put = |collection: &'static str, id: &'static str, value: Value| {
            let store = store.clone();
            async move { store.upsert(collection, id, fields(value)).await.unwrap() }
        };

        put(collections::PLAYERS, "a", json!({ "full_name": "Alive" })).await;
        put(collections::PLAYERS, "d", json!({ "full_name": "Gone", "isDeleted": true })).await;
        put(collections::PLAYER, "a", json!({ "city": "جدة" })).await;
        put(collections::PLAYER, "b", json!({ "full_name": "Legacy", "isDeleted": true })).await;
        put(collections::USERS, "u", json!({ "full_name": "Solo", "accountType": "player" })).await;
        put(collections::USERS, "c", json!({ "full_name": "Club", "accountType": "club" })).await;

        Directory::new(store, Arc::new(MemoryObjectStorage::new("https://files.test")), 2, 12)
    }

    #[tokio::test]
    async fn loads_and_merges_every_source() {
        let directory = seeded().await;
        let players = directory.load_players().await.unwrap();
        let ids: Vec<_> = players.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, ["a", "b", "u"]);
        assert_eq!(players[0].data["full_name"], "Alive");
        assert_eq!(players[0].data["city"], "جدة");
    }

    #[tokio::test]
    async fn pages_are_one_based() {
        let directory = seeded().await;
        let filter = DirectoryFilter::default();

        let first = directory.search(&filter, 0).await.unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.total, 3);
        assert_eq!(first.total_pages, 1);
        assert_eq!(first.players[0].image, image::DEFAULT_AVATAR);

        let beyond = directory.search(&filter, 5).await.unwrap();
        assert!(beyond.players.is_empty());
        assert_eq!(beyond.total, 3);
    }

    #[tokio::test]
    async fn rows_never_carry_contact_numbers() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert(
                collections::PLAYERS,
                "p2",
                fields(json!({ "full_name": "Ali", "phone": "+966500000000", "whatsapp": "+966511111111" })),
            )
            .await
            .unwrap();
        let directory = Directory::new(store, Arc::new(MemoryObjectStorage::new("https://files.test")), 10, 12);

        let page = directory.search(&DirectoryFilter::default(), 1).await.unwrap();

        let row = &page.players[0];
        assert_eq!(row.data["phone"], MASKED_CONTACT);
        assert_eq!(row.data["whatsapp"], MASKED_CONTACT);
        assert_eq!(row.name.as_deref(), Some("Ali"));
    }
}
