// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Storage
//!
//! Persistent key/value storage for dashboard session state (credentials,
//! connected wallet, current page, theme). All keys written by this crate
//! carry the `ajogun-` prefix.

pub mod local;

pub use local::{LocalStorage, StorageError, StorageResult};
