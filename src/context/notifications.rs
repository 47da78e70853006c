// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Toast notification list.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Notifications kept before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Shared, most-recent-first notification list.
#[derive(Debug, Clone)]
pub struct Notifications {
    entries: Arc<RwLock<VecDeque<Notification>>>,
    capacity: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub async fn push(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
        };
        let id = notification.id;

        match kind {
            NotificationKind::Error | NotificationKind::Warning => tracing::warn!(
                kind = ?kind,
                title = %notification.title,
                message = %notification.message,
                "Notification"
            ),
            NotificationKind::Success | NotificationKind::Info => tracing::info!(
                kind = ?kind,
                title = %notification.title,
                message = %notification.message,
                "Notification"
            ),
        }

        let mut entries = self.entries.write().await;
        entries.push_front(notification);
        entries.truncate(self.capacity);
        id
    }

    pub async fn success(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.push(NotificationKind::Success, title, message).await
    }

    pub async fn error(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.push(NotificationKind::Error, title, message).await
    }

    pub async fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.push(NotificationKind::Warning, title, message).await
    }

    pub async fn info(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.push(NotificationKind::Info, title, message).await
    }

    /// Remove one notification. Returns false when it was already gone.
    pub async fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Snapshot, most recent first.
    pub async fn list(&self) -> Vec<Notification> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
