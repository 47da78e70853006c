// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Same-origin forwarder for the will backend.
//!
//! Every request under `/api/proxy/` is re-issued against the configured
//! backend origin. The backend's status code is relayed verbatim; the only
//! status this module makes up is the 500 returned when nothing came back.

use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    api::cors::with_cors, config::PROXY_PREFIX, error::ApiError, models::ParsedBody,
    state::AppState,
};

/// Largest request body the proxy will buffer.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const APPLICATION_JSON: &str = "application/json";

/// Forward a request to `{BACKEND_ORIGIN}/{path}`.
#[utoipa::path(
    method(get, post, put, delete, options),
    path = "/api/proxy/{path}",
    tag = "Proxy",
    params(
        ("path" = String, Path, description = "Backend path, e.g. `wallet/alice/balance`")
    ),
    responses(
        (status = 200, description = "Backend reply relayed with the backend's status code"),
        (status = 400, description = "Strict mode: request body is not JSON"),
        (status = 405, description = "Unsupported method"),
        (status = 500, description = "Backend unreachable or timed out")
    )
)]
pub async fn proxy(State(state): State<AppState>, request: Request) -> Response {
    let path = backend_path(request.uri().path()).to_string();
    handle(&state, &path, request).await
}

/// The still-encoded path below the proxy prefix, without its leading `/`.
///
/// Read from the raw URI so that encodings the backend may reject are
/// relayed rather than refused here.
fn backend_path(uri_path: &str) -> &str {
    uri_path
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or(uri_path)
        .trim_start_matches('/')
}

async fn handle(state: &AppState, path: &str, request: Request) -> Response {
    match dispatch(state, path, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn dispatch(state: &AppState, path: &str, request: Request) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let method = parts.method;

    let body = match method {
        Method::OPTIONS => return Ok(preflight()),
        Method::GET | Method::HEAD => None,
        Method::POST | Method::PUT | Method::DELETE => {
            read_json_body(body, state.config.strict_body, &method, path).await?
        }
        other => {
            return Err(ApiError::method_not_allowed(format!(
                "Method {other} is not supported by the proxy"
            )))
        }
    };

    forward(state, method, path, parts.uri.query(), &parts.headers, body).await
}

/// Pre-flight answer; never reaches the backend.
fn preflight() -> Response {
    with_cors(StatusCode::OK.into_response())
}

/// Read the incoming body as JSON.
///
/// An empty body means no body. A body that is not JSON, or that cannot be
/// read within [`MAX_BODY_BYTES`], is dropped with a warning, or rejected
/// when `strict` is set.
async fn read_json_body(
    body: Body,
    strict: bool,
    method: &Method,
    path: &str,
) -> Result<Option<Value>, ApiError> {
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) if strict => {
            warn!(%method, path, error = %e, "Rejecting unreadable request body");
            return Err(
                ApiError::bad_request("Failed to read request body").with_detail(e.to_string())
            );
        }
        Err(e) => {
            warn!(
                %method,
                path,
                error = %e,
                "Request body could not be read, forwarding without a body"
            );
            return Ok(None);
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) if strict => {
            warn!(%method, path, error = %e, "Rejecting request body that is not JSON");
            Err(ApiError::bad_request("Request body is not valid JSON").with_detail(e.to_string()))
        }
        Err(e) => {
            warn!(
                %method,
                path,
                error = %e,
                "Request body is not JSON, forwarding without a body"
            );
            Ok(None)
        }
    }
}

pub(crate) fn target_url(origin: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", origin.trim_end_matches('/'), path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

async fn forward(
    state: &AppState,
    method: Method,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
    body: Option<Value>,
) -> Result<Response, ApiError> {
    let target = target_url(state.backend_origin(), path, query);
    let started = Instant::now();

    let mut outgoing = state
        .http
        .request(method.clone(), &target)
        .header(header::CONTENT_TYPE, APPLICATION_JSON)
        .header(header::ACCEPT, APPLICATION_JSON);

    if let Some(auth) = headers.get(header::AUTHORIZATION) {
        outgoing = outgoing.header(header::AUTHORIZATION, auth.clone());
    }
    if let Some(body) = &body {
        outgoing = outgoing.json(body);
    }

    let upstream = outgoing.send().await.map_err(|e| {
        warn!(%method, target = %target, error = %e, "Backend request failed");
        ApiError::proxy_failure(e.to_string())
    })?;

    let status = upstream.status();
    let text = upstream.text().await.map_err(|e| {
        warn!(%method, target = %target, error = %e, "Failed to read backend response");
        ApiError::proxy_failure(e.to_string())
    })?;

    let parsed = ParsedBody::parse(text);
    if matches!(parsed, ParsedBody::RawText(_)) {
        warn!(%method, target = %target, status = status.as_u16(), "Backend replied with a non-JSON body");
    }

    info!(
        %method,
        path,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Proxied request"
    );

    let relayed = parsed.into_relay_value(status.is_success());
    Ok(with_cors((status, Json(relayed)).into_response()))
}
