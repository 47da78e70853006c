// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Will Backend Client
//!
//! Typed wrapper over the will backend's HTTP API. The client can talk to
//! the backend directly or through the gateway's `/api/proxy` prefix; both
//! return the same bodies.
//!
//! ## Failure Contract
//!
//! [`ApiClient::send`] reports failures as a [`ClientError`], keeping
//! transport failures apart from non-2xx replies. The per-operation methods
//! (`create_wallet`, `revoke_will`, ...) never fail: every outcome comes
//! back as an [`Envelope`], with `success: false` and the cause as the
//! message when something went wrong.
//!
//! ## Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs     - ApiClient, ApiRequest, ClientError
//! ├── wallet.rs  - wallet creation, balance, transfer
//! └── wills.rs   - will lifecycle and monitoring
//! ```

use reqwest::{header, Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::models::{Envelope, ParsedBody};

mod wallet;
mod wills;

const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Status {
        status: StatusCode,
        message: String,
        body: ParsedBody,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status of a non-2xx reply.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One backend call: method, path segments and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Unescaped path segments; each is percent-encoded when the URL is built.
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(segments: &[&str]) -> Self {
        Self {
            method: Method::GET,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            body: None,
        }
    }

    pub fn post<B: Serialize>(segments: &[&str], body: &B) -> Result<Self, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
        Ok(Self {
            method: Method::POST,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            body: Some(body),
        })
    }

    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// HTTP client for the will backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    bearer: Option<String>,
    http: Client,
}

impl ApiClient {
    /// Create a client rooted at `base_url`, e.g. the backend origin or
    /// `https://dashboard.example/api/proxy`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, Client::new())
    }

    pub fn with_http(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: None,
            http,
        }
    }

    /// Attach a bearer credential to every request.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, segments: &[String]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue `request` and normalize the reply.
    ///
    /// 2xx replies become an [`Envelope`]; anything else is a [`ClientError`].
    pub async fn send(&self, request: ApiRequest) -> Result<Envelope, ClientError> {
        let url = self.url_for(&request.segments)?;
        debug!(method = %request.method, path = %request.path(), "Calling will backend");

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(header::CONTENT_TYPE, APPLICATION_JSON)
            .header(header::ACCEPT, APPLICATION_JSON);
        if let Some(token) = &self.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let parsed = ParsedBody::parse(text);

        if !status.is_success() {
            let message = parsed
                .error_message()
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(ClientError::Status {
                status,
                message,
                body: parsed,
            });
        }

        Ok(Envelope::from_parsed(parsed, true))
    }

    /// Like [`send`](Self::send), with every failure folded into the envelope.
    async fn call(&self, request: Result<ApiRequest, ClientError>) -> Envelope {
        let path = request.as_ref().map(ApiRequest::path).unwrap_or_default();
        let result = match request {
            Ok(request) => self.send(request).await,
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            warn!(path = %path, status = ?e.status(), error = %e, "Will backend call failed");
            Envelope::failure(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_backend, unreachable_origin};
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    #[test]
    fn url_for_encodes_segments() {
        let client = ApiClient::new("http://localhost:3000/api/proxy/");
        let url = client
            .url_for(&["wallet".to_string(), "al ice/2".to_string(), "balance".to_string()])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/proxy/wallet/al%20ice%2F2/balance"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let client = ApiClient::new("not a url");
        assert!(matches!(
            client.url_for(&["x".to_string()]),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn send_distinguishes_status_failures() {
        let backend = spawn_backend(Router::new().route(
            "/will/monitored",
            get(|| async {
                (
                    axum::http::StatusCode::FORBIDDEN,
                    Json(json!({"error": "not allowed"})),
                )
            }),
        ))
        .await;
        let client = ApiClient::new(&backend.origin);

        let err = client
            .send(ApiRequest::get(&["will", "monitored"]))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.to_string(), "not allowed");
        match err {
            ClientError::Status { body, .. } => {
                assert_eq!(body, ParsedBody::Json(json!({"error": "not allowed"})))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_uses_status_code_when_body_is_empty() {
        let backend = spawn_backend(Router::new().route(
            "/will/monitored",
            get(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;

        let err = ApiClient::new(&backend.origin)
            .send(ApiRequest::get(&["will", "monitored"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[tokio::test]
    async fn transport_failure_is_an_envelope_from_operations() {
        let client = ApiClient::new(unreachable_origin().await);

        let err = client
            .send(ApiRequest::get(&["will", "monitored"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));

        let envelope = client.get_monitored_wills().await;
        assert!(!envelope.success);
        assert!(envelope
            .message
            .as_deref()
            .unwrap_or_default()
            .starts_with("Network error"));
    }

    #[tokio::test]
    async fn sends_json_headers_and_bearer() {
        let backend = spawn_backend(Router::new().route(
            "/will/monitored",
            get(|| async { Json(json!({"wills": []})) }),
        ))
        .await;

        let envelope = ApiClient::new(&backend.origin)
            .with_bearer("tok")
            .get_monitored_wills()
            .await;
        assert!(envelope.success);

        let hit = &backend.hits()[0];
        assert_eq!(hit.authorization.as_deref(), Some("Bearer tok"));
        assert_eq!(hit.content_type.as_deref(), Some("application/json"));
        assert_eq!(hit.accept.as_deref(), Some("application/json"));
    }
}
