// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use super::{merge_fields, Document, DocumentStore, Fields, PageRequest, StoreError};
use crate::db::{Database, DbConnection};
use crate::schema::documents;

/// Document store backed by a single PostgreSQL JSONB table
pub struct PgDocumentStore {
    db: Arc<Database>,
}

impl PgDocumentStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn connection(&self) -> Result<DbConnection, StoreError> {
        self.db.get_connection().await.map_err(|e| {
            error!("Database connection error: {}", e);
            StoreError::Pool(e.to_string())
        })
    }

    /// Read-merge-write under a row lock. With `must_exist` the write is
    /// refused when the document is missing.
    async fn merge_into(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        must_exist: bool,
    ) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let owned_collection = collection.to_owned();
        let owned_id = id.to_owned();

        let merged = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let collection = owned_collection;
                    let id = owned_id;
                    let existing = documents::table
                        .filter(documents::collection.eq(&collection))
                        .filter(documents::id.eq(&id))
                        .select(documents::data)
                        .for_update()
                        .first::<Value>(conn)
                        .await
                        .optional()?;

                    if existing.is_none() && must_exist {
                        return Ok(false);
                    }

                    let mut data = match existing {
                        Some(Value::Object(map)) => map,
                        _ => Fields::new(),
                    };
                    merge_fields(&mut data, fields);

                    let now = Utc::now();
                    diesel::insert_into(documents::table)
                        .values((
                            documents::collection.eq(&collection),
                            documents::id.eq(&id),
                            documents::data.eq(Value::Object(data)),
                            documents::created_at.eq(now),
                            documents::updated_at.eq(now),
                        ))
                        .on_conflict((documents::collection, documents::id))
                        .do_update()
                        .set((
                            documents::data.eq(excluded(documents::data)),
                            documents::updated_at.eq(now),
                        ))
                        .execute(conn)
                        .await?;

                    debug!("Merged document {}/{}", collection, id);
                    Ok(true)
                }
                .scope_boxed()
            })
            .await?;

        if merged {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
        }
    }
}

fn into_document(id: String, data: Value) -> Document {
    match data {
        Value::Object(map) => Document::new(id, map),
        _ => Document::new(id, Fields::new()),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let mut conn = self.connection().await?;

        let row = documents::table
            .filter(documents::collection.eq(collection))
            .filter(documents::id.eq(id))
            .select((documents::id, documents::data))
            .first::<(String, Value)>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(|(id, data)| into_document(id, data)))
    }

    async fn upsert(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.merge_into(collection, id, fields, false).await
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let mut conn = self.connection().await?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = Utc::now();

        diesel::insert_into(documents::table)
            .values((
                documents::collection.eq(collection),
                documents::id.eq(&id),
                documents::data.eq(Value::Object(fields)),
                documents::created_at.eq(now),
                documents::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await?;

        debug!("Created document {}/{}", collection, id);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.merge_into(collection, id, fields, true).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;

        diesel::delete(
            documents::table
                .filter(documents::collection.eq(collection))
                .filter(documents::id.eq(id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(())
    }

    async fn list(&self, collection: &str, page: PageRequest) -> Result<Vec<Document>, StoreError> {
        let mut conn = self.connection().await?;
        let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);

        let mut query = documents::table
            .filter(documents::collection.eq(collection))
            .select((documents::id, documents::data))
            .order_by(documents::id.asc())
            .limit(limit)
            .into_boxed();

        if let Some(after) = page.start_after {
            query = query.filter(documents::id.gt(after));
        }

        let rows = query.load::<(String, Value)>(&mut conn).await?;
        Ok(rows
            .into_iter()
            .map(|(id, data)| into_document(id, data))
            .collect())
    }
}
