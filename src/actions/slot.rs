// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-operation request state with sequence tickets.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Visible state of one operation family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ApiState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> ApiState<T> {
    pub fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    pub fn succeeded(data: T) -> Self {
        Self {
            data: Some(data),
            loading: false,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(error.into()),
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.loading && self.data.is_none() && self.error.is_none()
    }
}

/// Issued by [`Slot::begin`]; only the newest ticket may settle the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug)]
struct SlotInner<T> {
    state: ApiState<T>,
    latest: u64,
}

/// Shared, clonable handle to one operation family's state.
#[derive(Debug)]
pub struct Slot<T> {
    name: &'static str,
    inner: Arc<RwLock<SlotInner<T>>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Slot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Arc::new(RwLock::new(SlotInner {
                state: ApiState::default(),
                latest: 0,
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enter `loading` and take a fresh ticket.
    pub async fn begin(&self) -> Ticket {
        let mut inner = self.inner.write().await;
        inner.latest += 1;
        inner.state = ApiState::loading();
        Ticket(inner.latest)
    }

    /// Settle the slot. Returns false, leaving the state alone, when a newer
    /// request has started since `ticket` was issued.
    pub async fn finish(&self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        let mut inner = self.inner.write().await;
        if ticket.0 != inner.latest {
            debug!(
                slot = self.name,
                ticket = ticket.0,
                latest = inner.latest,
                "Discarding stale completion"
            );
            return false;
        }
        inner.state = match outcome {
            Ok(data) => ApiState::succeeded(data),
            Err(error) => ApiState::failed(error),
        };
        true
    }

    pub async fn snapshot(&self) -> ApiState<T> {
        self.inner.read().await.state.clone()
    }

    /// Back to idle. In-flight requests issued before the reset are ignored
    /// when they complete.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.latest += 1;
        inner.state = ApiState::default();
    }
}
