// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `BACKEND_ORIGIN` | Will backend the proxy forwards to | `https://ajogun-backend.onrender.com` |
//! | `PROXY_TIMEOUT_SECS` | Timeout for one forwarded request | `30` |
//! | `PROXY_STRICT_BODY` | Reject request bodies that are not JSON | `false` |
//! | `TLS_CERT_PATH` | PEM certificate chain (HTTPS when set with key) | unset |
//! | `TLS_KEY_PATH` | PEM private key | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const BACKEND_ORIGIN_ENV: &str = "BACKEND_ORIGIN";
pub const PROXY_TIMEOUT_ENV: &str = "PROXY_TIMEOUT_SECS";
pub const PROXY_STRICT_BODY_ENV: &str = "PROXY_STRICT_BODY";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Backend origin used when `BACKEND_ORIGIN` is not set.
pub const DEFAULT_BACKEND_ORIGIN: &str = "https://ajogun-backend.onrender.com";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PROXY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Path prefix the proxy is mounted under.
pub const PROXY_PREFIX: &str = "/api/proxy";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid URL origin: {reason}")]
    InvalidOrigin { name: &'static str, reason: String },

    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be true or false, got {value:?}")]
    InvalidBool { name: &'static str, value: String },

    #[error("invalid bind address {0}")]
    InvalidBindAddress(String),

    #[error("{0} and {1} must be set together")]
    IncompleteTls(&'static str, &'static str),
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Certificate and key used when serving HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Settings for the proxy server process.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind: SocketAddr,
    /// Backend origin without a trailing slash.
    pub backend_origin: String,
    pub timeout: Duration,
    pub strict_body: bool,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            backend_origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            timeout: DEFAULT_PROXY_TIMEOUT,
            strict_body: false,
            tls: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ProxyConfig {
    /// Config with defaults everywhere except the backend origin.
    pub fn for_backend(origin: impl Into<String>) -> Self {
        Self {
            backend_origin: origin.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_optional)
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
                name: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let bind: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(format!("{host}:{port}")))?;

        let backend_origin = parse_origin(
            &lookup(BACKEND_ORIGIN_ENV).unwrap_or_else(|| DEFAULT_BACKEND_ORIGIN.to_string()),
        )?;

        let timeout = match lookup(PROXY_TIMEOUT_ENV) {
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidNumber {
                    name: PROXY_TIMEOUT_ENV,
                    value,
                })?,
            None => DEFAULT_PROXY_TIMEOUT,
        };

        let strict_body = match lookup(PROXY_STRICT_BODY_ENV) {
            Some(value) => parse_bool(PROXY_STRICT_BODY_ENV, value)?,
            None => false,
        };

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::IncompleteTls(
                    TLS_CERT_PATH_ENV,
                    TLS_KEY_PATH_ENV,
                ))
            }
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            bind,
            backend_origin,
            timeout,
            strict_body,
            tls,
            log_format,
        })
    }
}

/// Validate an origin and strip any trailing slash.
fn parse_origin(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidOrigin {
        name: BACKEND_ORIGIN_ENV,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidOrigin {
            name: BACKEND_ORIGIN_ENV,
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { name, value }),
    }
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
