// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Dashboard Contexts
//!
//! Application state shared by every dashboard view: who is signed in,
//! which wallet is connected, the current page, the colour theme and the
//! notification list. [`Session`] owns all of them and mirrors the
//! persistent parts into [`LocalStorage`](crate::storage::LocalStorage).
//!
//! ## Persisted Keys
//!
//! | Key | Context | Cleared on logout |
//! |-----|---------|-------------------|
//! | `ajogun-userId` | auth | yes |
//! | `ajogun-password` | auth | yes |
//! | `ajogun-walletAddress` | wallet | yes |
//! | `ajogun-currentPage` | app | yes |
//! | `ajogun-theme` | theme | no |

pub mod notifications;
pub mod session;

pub use notifications::{Notification, NotificationKind, Notifications};
pub use session::{AppContext, AuthContext, Credentials, Page, Session, Theme, WalletContext};

/// Prefix shared by every key this crate persists.
pub const KEY_PREFIX: &str = "ajogun-";

pub const USER_ID_KEY: &str = "ajogun-userId";
pub const PASSWORD_KEY: &str = "ajogun-password";
pub const WALLET_ADDRESS_KEY: &str = "ajogun-walletAddress";
pub const CURRENT_PAGE_KEY: &str = "ajogun-currentPage";
pub const THEME_KEY: &str = "ajogun-theme";
