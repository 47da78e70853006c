// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Wire types shared by the proxy, the backend client and the dashboard
//! state layers.
//!
//! ## Envelopes
//!
//! Every backend reply is coerced into an [`Envelope`]: `{success, message?}`
//! with the remaining fields of the reply merged in. Parsing happens through
//! [`ParsedBody`], which keeps "the backend sent JSON" and "the backend sent
//! something else" as separate cases.
//!
//! ## Model Categories
//!
//! - **Envelopes**: normalized backend replies
//! - **Wills**: will records as listed by the backend
//! - **Requests**: JSON bodies sent to the backend

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// EVM-style wallet address (`0x` followed by 40 hex characters).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address is `0x` + 40 hex digits.
    pub fn is_valid(&self) -> bool {
        let Some(hex) = self.0.strip_prefix("0x").or_else(|| self.0.strip_prefix("0X")) else {
            return false;
        };
        hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Parsed Bodies and Envelopes
// =============================================================================

/// A response body after the JSON parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Json(Value),
    RawText(String),
}

impl ParsedBody {
    /// Parse `text` as JSON, keeping the raw text when that fails.
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ParsedBody::Json(value),
            Err(_) => ParsedBody::RawText(text),
        }
    }

    /// The JSON the proxy relays to the browser.
    ///
    /// JSON is passed through untouched; raw text becomes
    /// `{"message": text, "success": http_ok}`.
    pub fn into_relay_value(self, http_ok: bool) -> Value {
        match self {
            ParsedBody::Json(value) => value,
            ParsedBody::RawText(text) => fallback_value(text, http_ok),
        }
    }

    /// Human readable failure reason carried by the body, if any.
    pub fn error_message(&self) -> Option<String> {
        match self {
            ParsedBody::Json(Value::Object(map)) => ["message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            ParsedBody::Json(_) => None,
            ParsedBody::RawText(text) => (!text.trim().is_empty()).then(|| text.clone()),
        }
    }
}

fn fallback_value(text: String, http_ok: bool) -> Value {
    let mut map = Map::new();
    map.insert("message".to_string(), Value::String(text));
    map.insert("success".to_string(), Value::Bool(http_ok));
    Value::Object(map)
}

/// Normalized backend reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Every other field of the backend reply.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            fields: Map::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            fields: Map::new(),
        }
    }

    /// Build the envelope for a reply whose status was `http_ok`.
    ///
    /// A JSON object is merged in with `success` defaulting to `http_ok`
    /// (a non-boolean `success` is dropped), other JSON values land under
    /// `data`, and raw text becomes the message.
    pub fn from_parsed(body: ParsedBody, http_ok: bool) -> Self {
        match body {
            ParsedBody::Json(Value::Object(mut map)) => {
                let success = match map.remove("success") {
                    Some(Value::Bool(flag)) => flag,
                    _ => http_ok,
                };
                let message = match map.remove("message") {
                    Some(Value::String(text)) => Some(text),
                    Some(other) => {
                        map.insert("message".to_string(), other);
                        None
                    }
                    None => None,
                };
                Self {
                    success,
                    message,
                    fields: map,
                }
            }
            ParsedBody::Json(other) => {
                let mut fields = Map::new();
                fields.insert("data".to_string(), other);
                Self {
                    success: http_ok,
                    message: None,
                    fields,
                }
            }
            ParsedBody::RawText(text) => Self {
                success: http_ok,
                message: Some(text),
                fields: Map::new(),
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Copy `alias` into `canonical` when the backend only sent the alias.
    pub fn canonicalize(&mut self, canonical: &str, alias: &str) {
        if self.fields.contains_key(canonical) {
            return;
        }
        if let Some(value) = self.fields.get(alias).cloned() {
            self.fields.insert(canonical.to_string(), value);
        }
    }

    /// The message to show for a failed envelope.
    pub fn error_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.str_field("error").map(str::to_string))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Request failed".to_string())
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Will Models
// =============================================================================

/// Lifecycle state of a will as reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WillStatus {
    Active,
    Executed,
    Revoked,
    #[serde(other)]
    Unknown,
}

/// A will as listed by the backend.
///
/// Fields this crate does not interpret are kept in `extra` so the record
/// can be handed back to a UI unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Will {
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub will_index: u64,
    #[serde(default)]
    pub heirs: Vec<WalletAddress>,
    #[serde(default)]
    pub shares: Vec<u32>,
    #[serde(deserialize_with = "string_from_string_or_number")]
    pub amount: String,
    pub status: WillStatus,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Will {
    /// Numeric amount for sorting; unparsable amounts count as zero.
    pub fn amount_value(&self) -> f64 {
        self.amount.trim().parse().unwrap_or(0.0)
    }
}

fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom("expected a non-negative integer")),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected integer, got {other}"
        ))),
    }
}

fn string_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected amount, got {other}"
        ))),
    }
}

/// Accepts RFC 3339 strings, unix seconds or unix milliseconds.
fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(_) => s.trim().parse::<i64>().ok().and_then(timestamp_from_number),
        },
        Some(Value::Number(n)) => n.as_i64().and_then(timestamp_from_number),
        Some(_) => None,
    })
}

fn timestamp_from_number(raw: i64) -> Option<DateTime<Utc>> {
    // Anything past year 2286 in seconds is a millisecond timestamp.
    if raw.abs() >= 10_000_000_000 {
        Utc.timestamp_millis_opt(raw).single()
    } else {
        Utc.timestamp_opt(raw, 0).single()
    }
}

// =============================================================================
// Request Models
// =============================================================================

/// Body for wallet creation and activity pings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsBody {
    pub user_id: String,
    pub password: String,
}

/// Body for a token transfer from the user's custodial wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    pub password: String,
    pub to_address: WalletAddress,
    pub amount: String,
}

/// Body for creating a will.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateWillBody {
    pub user_id: String,
    pub password: String,
    pub heirs: Vec<WalletAddress>,
    pub shares: Vec<u32>,
    pub amount: String,
}

/// Body for the owner-authorised execution calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WillExecutionBody {
    pub user_id: String,
    pub password: String,
    pub owner_address: WalletAddress,
    pub will_index: u64,
}

/// Body for the platform-triggered execution call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoExecutionBody {
    pub owner_address: WalletAddress,
    pub will_index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevokeWillBody {
    pub user_id: String,
    pub password: String,
    pub will_index: u64,
}
