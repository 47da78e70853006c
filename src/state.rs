// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use reqwest::Client;
use tracing::warn;

use crate::config::ProxyConfig;

/// Shared state for the proxy router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    /// Pooled client used for every forwarded request.
    pub http: Client,
}

impl AppState {
    /// Build the state, failing if the forwarding client cannot be built
    /// with the configured timeout.
    pub fn try_new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Like [`try_new`](Self::try_new), falling back to a client without
    /// the forwarding timeout.
    pub fn new(config: ProxyConfig) -> Self {
        let http = match Client::builder().timeout(config.timeout).build() {
            Ok(http) => http,
            Err(e) => {
                warn!(
                    error = %e,
                    timeout_secs = config.timeout.as_secs(),
                    "Failed to build forwarding client, proxy timeout not applied"
                );
                Client::new()
            }
        };

        Self {
            config: Arc::new(config),
            http,
        }
    }

    pub fn backend_origin(&self) -> &str {
        &self.config.backend_origin
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ProxyConfig::default())
    }
}
