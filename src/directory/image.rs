// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Player avatar resolution across historical image fields and storage buckets.

use serde_json::Value;
use tracing::{debug, warn};

use crate::affiliation::{affiliation_of, Affiliation};
use crate::metrics::STORAGE_PROBES;
use crate::storage::ObjectStorage;
use crate::store::Fields;

pub const DEFAULT_AVATAR: &str = "/images/default-avatar.png";

/// Image fields in the order they are trusted
pub const IMAGE_FIELDS: [&str; 10] = [
    "profile_image_url",
    "profile_image",
    "avatar",
    "photoURL",
    "profilePicture",
    "image",
    "photo",
    "picture",
    "profile_picture",
    "profilePhoto",
];

/// Hosts that only ever appear in placeholder data
const INVALID_DOMAINS: [&str; 6] = [
    "test-url.com",
    "example.com",
    "placeholder.com",
    "dummy-url.com",
    "fake-image.com",
    "localhost:3000",
];

const BLANK_LITERALS: [&str; 3] = ["undefined", "null", "[object Object]"];

pub const EXTENSIONS: [&str; 4] = ["jpg", "png", "jpeg", "webp"];

pub const INDEPENDENT_BUCKET: &str = "avatars";

const FALLBACK_BUCKETS: [&str; 5] = [
    INDEPENDENT_BUCKET,
    "playerclub",
    "playeracademy",
    "playertrainer",
    "playeragent",
];

/// URL held by an image field: the string itself or the `url` of an object
pub fn candidate_url(value: &Value) -> Option<&str> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("url").and_then(Value::as_str)?,
        _ => return None,
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Whether a URL can be shown as is
pub fn is_well_formed(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || BLANK_LITERALS.contains(&url) {
        return false;
    }
    if INVALID_DOMAINS.iter().any(|domain| url.contains(domain)) {
        return false;
    }
    url.starts_with("http") || url.starts_with("data:") || url.starts_with('/')
}

/// First well-formed image URL stored on the document, in field priority order
pub fn stored_image(fields: &Fields) -> Option<&str> {
    IMAGE_FIELDS
        .iter()
        .filter_map(|key| fields.get(*key))
        .filter_map(candidate_url)
        .find(|url| is_well_formed(url))
}

/// Buckets to probe: the affiliation's own bucket first, then the rest
pub fn bucket_order(affiliation: &Affiliation) -> Vec<&'static str> {
    let preferred = affiliation
        .kind()
        .map(|kind| kind.player_bucket())
        .unwrap_or(INDEPENDENT_BUCKET);

    let mut buckets = vec![preferred];
    for bucket in FALLBACK_BUCKETS {
        if !buckets.contains(&bucket) {
            buckets.push(bucket);
        }
    }
    buckets
}

/// Image to show for a player.
///
/// A stored well-formed URL wins. Otherwise `<player_id>.<ext>` is probed in
/// every bucket and the first existing object's public URL is returned.
/// Probe failures count as a miss. Nothing found gives [`DEFAULT_AVATAR`].
pub async fn resolve_image(storage: &dyn ObjectStorage, player_id: &str, fields: &Fields) -> String {
    if let Some(url) = stored_image(fields) {
        return url.to_string();
    }

    for bucket in bucket_order(&affiliation_of(fields)) {
        for ext in EXTENSIONS {
            let key = format!("{}.{}", player_id, ext);
            match storage.exists(bucket, &key).await {
                Ok(true) => {
                    STORAGE_PROBES.with_label_values(&[bucket, "hit"]).inc();
                    debug!(%player_id, bucket, %key, "Found player image in storage");
                    return storage.public_url(bucket, &key);
                }
                Ok(false) => {
                    STORAGE_PROBES.with_label_values(&[bucket, "miss"]).inc();
                }
                Err(e) => {
                    STORAGE_PROBES.with_label_values(&[bucket, "error"]).inc();
                    warn!(%player_id, bucket, %key, "Storage probe failed: {}", e);
                }
            }
        }
    }

    DEFAULT_AVATAR.to_string()
}
