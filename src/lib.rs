// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ajogun Dashboard - Digital Will Gateway
//!
//! This crate provides the server and client halves of the Ajogun digital
//! will dashboard: a CORS-enabled proxy in front of the will backend, a
//! typed client for the backend's wallet and will endpoints, and the
//! session state the dashboard views are built on.
//!
//! ## Modules
//!
//! - `api` - HTTP proxy, health and docs handlers (Axum)
//! - `client` - Will backend client
//! - `actions` - Per-operation request state and notifications
//! - `context` - Session contexts (auth, wallet, page, theme)
//! - `forms` - Dashboard form validation
//! - `views` - Will list filtering and sorting
//! - `storage` - Persisted session keys

pub mod actions;
pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod forms;
pub mod models;
pub mod state;
pub mod storage;
pub mod views;

#[cfg(test)]
mod test_support;
