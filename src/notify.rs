// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Admin notifications for newly uploaded player videos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("notification endpoint answered {0}")]
    Rejected(u16),
}

/// One newly added video
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoNotice {
    pub title: String,
    pub user_name: String,
    pub account_type: String,
    pub video_id: String,
    pub upload_date: DateTime<Utc>,
}

impl VideoNotice {
    /// Notice for the video at `index` of a player's video list. The
    /// description doubles as the title; the URL stands in when there is none.
    pub fn new(player_id: &str, player_name: &str, index: usize, url: &str, desc: Option<&str>) -> Self {
        let title = desc
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(url)
            .to_string();
        Self {
            title,
            user_name: player_name.to_string(),
            account_type: "player".to_string(),
            video_id: format!("{}_{}", player_id, index),
            upload_date: Utc::now(),
        }
    }

    pub fn payload(&self) -> serde_json::Value {
        json!({
            "action": "notify_single_video",
            "videoData": self,
        })
    }
}

#[async_trait]
pub trait AdminNotifier: Send + Sync {
    async fn notify_video(&self, notice: &VideoNotice) -> Result<(), NotifyError>;
}

/// Send a notice and log any failure instead of returning it
pub async fn notify_quietly(notifier: &dyn AdminNotifier, notice: &VideoNotice) {
    match notifier.notify_video(notice).await {
        Ok(()) => debug!(video_id = %notice.video_id, "Sent video notification"),
        Err(e) => warn!(video_id = %notice.video_id, "Video notification failed: {}", e),
    }
}

/// Posts notices as JSON to a webhook
pub struct HttpVideoNotifier {
    url: String,
    client: reqwest::Client,
}

impl HttpVideoNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl AdminNotifier for HttpVideoNotifier {
    async fn notify_video(&self, notice: &VideoNotice) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&notice.payload())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(response.status().as_u16()))
        }
    }
}

/// Used when no webhook is configured
pub struct DisabledNotifier;

#[async_trait]
impl AdminNotifier for DisabledNotifier {
    async fn notify_video(&self, notice: &VideoNotice) -> Result<(), NotifyError> {
        debug!(video_id = %notice.video_id, "Video notifications disabled");
        Ok(())
    }
}

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<VideoNotice>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that records the attempt and then reports a rejection
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<VideoNotice> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl AdminNotifier for RecordingNotifier {
    async fn notify_video(&self, notice: &VideoNotice) -> Result<(), NotifyError> {
        self.sent.lock().await.push(notice.clone());
        if self.fail {
            Err(NotifyError::Rejected(503))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn payload_matches_webhook_contract() {
        let notice = VideoNotice::new("p1", "Ali", 2, "https://v/3", Some("  "));
        let payload = notice.payload();

        assert_eq!(payload["action"], "notify_single_video");
        assert_eq!(payload["videoData"]["title"], "https://v/3");
        assert_eq!(payload["videoData"]["userName"], "Ali");
        assert_eq!(payload["videoData"]["accountType"], "player");
        assert_eq!(payload["videoData"]["videoId"], "p1_2");
        assert!(payload["videoData"]["uploadDate"].is_string());
    }

    #[tokio::test]
    #[traced_test]
    async fn failures_are_logged_and_swallowed() {
        let notifier = RecordingNotifier::failing();
        let notice = VideoNotice::new("p1", "Ali", 0, "https://v/1", Some("هدف"));

        notify_quietly(&notifier, &notice).await;

        assert_eq!(notifier.sent().await.len(), 1);
        assert!(logs_contain("Video notification failed"));
    }
}
