// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filtering and ordering for the "My Wills" and monitoring lists.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{Envelope, Will, WillStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WillFilter {
    #[default]
    All,
    Active,
    Executed,
    Revoked,
}

impl WillFilter {
    pub fn matches(self, will: &Will) -> bool {
        match self {
            WillFilter::All => true,
            WillFilter::Active => will.status == WillStatus::Active,
            WillFilter::Executed => will.status == WillStatus::Executed,
            WillFilter::Revoked => will.status == WillStatus::Revoked,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WillSort {
    #[default]
    Newest,
    Oldest,
    AmountDesc,
    AmountAsc,
    Index,
}

impl WillSort {
    fn compare(self, a: &Will, b: &Will) -> Ordering {
        match self {
            WillSort::Newest => by_created(a, b, true),
            WillSort::Oldest => by_created(a, b, false),
            WillSort::AmountDesc => b.amount_value().total_cmp(&a.amount_value()),
            WillSort::AmountAsc => a.amount_value().total_cmp(&b.amount_value()),
            WillSort::Index => a.will_index.cmp(&b.will_index),
        }
    }
}

/// Undated wills go last in both directions.
fn by_created(a: &Will, b: &Will, newest_first: bool) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(x), Some(y)) if newest_first => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Pull the wills out of a wills-list envelope.
///
/// The list is read from `wills`, falling back to `data` for backends that
/// reply with a bare array. Entries that do not decode are skipped.
pub fn decode_wills(envelope: &Envelope) -> Vec<Will> {
    let Some(Value::Array(items)) = envelope.get("wills").or_else(|| envelope.get("data")) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Will>(item.clone()) {
            Ok(will) => Some(will),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable will");
                None
            }
        })
        .collect()
}

/// Filter then sort. The sort is stable, so ties keep backend order.
pub fn apply(wills: &[Will], filter: WillFilter, sort: WillSort) -> Vec<Will> {
    let mut selected: Vec<Will> = wills.iter().filter(|w| filter.matches(w)).cloned().collect();
    selected.sort_by(|a, b| sort.compare(a, b));
    selected
}
