// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use ajogun_dashboard::api::router;
use ajogun_dashboard::config::{LogFormat, ProxyConfig, DEFAULT_LOG_FILTER};
use ajogun_dashboard::state::AppState;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }
    shutdown.cancel();
}

#[tokio::main]
async fn main() {
    let config = ProxyConfig::from_env();
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let addr = config.bind;
    let tls = config.tls.clone();
    info!(
        backend_origin = %config.backend_origin,
        timeout_secs = config.timeout.as_secs(),
        strict_body = config.strict_body,
        "Ajogun dashboard gateway starting"
    );

    let state = match AppState::try_new(config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build forwarding client");
            std::process::exit(1);
        }
    };
    let app = router(state);

    let shutdown = CancellationToken::new();
    let handle = Handle::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        let handle = handle.clone();
        async move {
            shutdown_signal(shutdown).await;
            info!("Shutdown signal received, draining connections");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    let served = match tls {
        Some(paths) => {
            let tls_config = match RustlsConfig::from_pem_file(&paths.cert, &paths.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(cert = %paths.cert.display(), error = %e, "Failed to load TLS certificate");
                    std::process::exit(1);
                }
            };
            info!("Ajogun dashboard gateway listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!("Ajogun dashboard gateway listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    shutdown.cancel();
    if let Err(e) = served {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
    info!("Ajogun dashboard gateway stopped");
}
