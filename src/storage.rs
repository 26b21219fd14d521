// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Object storage: buckets of objects addressed by key, with public URLs.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected storage response {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Public URL of an object, whether or not it exists
    fn public_url(&self, bucket: &str, key: &str) -> String;

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError>;
}

/// Storage service reached over HTTP. Existence is checked with `HEAD` on the
/// object's public URL.
pub struct HttpObjectStorage {
    base_url: String,
    client: reqwest::Client,
}

impl HttpObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, key)
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        let url = self.public_url(bucket, key);
        let status = self.client.head(&url).send().await?.status();
        debug!(%url, status = status.as_u16(), "Probed storage object");

        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            Ok(false)
        } else {
            Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            })
        }
    }
}

/// In-process storage holding a set of existing objects
#[derive(Debug, Default)]
pub struct MemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashSet<(String, String)>>,
    probes: RwLock<Vec<(String, String)>>,
}

impl MemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub async fn put(&self, bucket: &str, key: &str) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()));
    }

    /// Every `(bucket, key)` probed so far, in order
    pub async fn probes(&self) -> Vec<(String, String)> {
        self.probes.read().await.clone()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, key)
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        let entry = (bucket.to_string(), key.to_string());
        self.probes.write().await.push(entry.clone());
        Ok(self.objects.read().await.contains(&entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_strips_trailing_slash() {
        let storage = HttpObjectStorage::new("https://files.test/").unwrap();
        assert_eq!(
            storage.public_url("avatars", "p1.jpg"),
            "https://files.test/storage/v1/object/public/avatars/p1.jpg"
        );
    }

    #[tokio::test]
    async fn memory_storage_records_probes() {
        let storage = MemoryObjectStorage::new("https://files.test");
        storage.put("avatars", "p1.png").await;

        assert!(!storage.exists("avatars", "p1.jpg").await.unwrap());
        assert!(storage.exists("avatars", "p1.png").await.unwrap());
        assert_eq!(storage.probes().await.len(), 2);
    }
}
