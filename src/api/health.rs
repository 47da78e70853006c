// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// How long the readiness probe waits for the backend.
const BACKEND_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the gateway process is running.
    pub service: String,
    /// Whether the will backend answered ("ok" or "unreachable").
    pub backend: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Any HTTP answer from the backend origin counts as reachable.
async fn check_backend(state: &AppState) -> bool {
    let probe = state
        .http
        .get(state.backend_origin())
        .timeout(BACKEND_PROBE_TIMEOUT)
        .send()
        .await;

    match probe {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, origin = %state.backend_origin(), "Backend probe failed");
            false
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if the backend answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Gateway and backend are healthy", body = ReadyResponse),
        (status = 503, description = "Backend is unreachable", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let backend_ok = check_backend(&state).await;

    let response = ReadyResponse {
        status: if backend_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            backend: if backend_ok { "ok" } else { "unreachable" }.to_string(),
        },
    };

    let status = if backend_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ProxyConfig,
        test_support::{spawn_backend, unreachable_origin},
    };
    use axum::Router;

    #[tokio::test]
    async fn liveness_is_always_ok() {
        assert_eq!(liveness().await.0.status, "ok");
    }

    #[tokio::test]
    async fn ready_when_backend_answers_even_with_404() {
        let backend = spawn_backend(Router::new()).await;
        let state = AppState::new(ProxyConfig::for_backend(&backend.origin));

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.backend, "ok");
    }

    #[tokio::test]
    async fn degraded_when_backend_is_down() {
        let state = AppState::new(ProxyConfig::for_backend(unreachable_origin().await));

        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.backend, "unreachable");
        assert_eq!(body.checks.service, "ok");
    }
}
