// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session lifecycle: load persisted keys, mutate, tear down on logout.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{
    Notifications, CURRENT_PAGE_KEY, KEY_PREFIX, PASSWORD_KEY, THEME_KEY, USER_ID_KEY,
    WALLET_ADDRESS_KEY,
};
use crate::models::WalletAddress;
use crate::storage::{LocalStorage, StorageResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletContext {
    pub address: Option<WalletAddress>,
    /// Last balance reported by the backend. Not persisted.
    pub balance: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Dashboard,
    CreateWallet,
    CreateWill,
    MyWills,
    Transfer,
    Monitoring,
    Settings,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::CreateWallet,
        Page::CreateWill,
        Page::MyWills,
        Page::Transfer,
        Page::Monitoring,
        Page::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::CreateWallet => "create-wallet",
            Page::CreateWill => "create-will",
            Page::MyWills => "my-wills",
            Page::Transfer => "transfer",
            Page::Monitoring => "monitoring",
            Page::Settings => "settings",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| format!("unknown page '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppContext {
    pub current_page: Page,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    auth: AuthContext,
    wallet: WalletContext,
    app: AppContext,
    theme: Theme,
}

impl SessionState {
    fn load(storage: &LocalStorage) -> Self {
        let credentials = match (storage.get(USER_ID_KEY), storage.get(PASSWORD_KEY)) {
            (Some(user_id), Some(password)) => Some(Credentials {
                user_id: user_id.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        };

        Self {
            auth: AuthContext { credentials },
            wallet: WalletContext {
                address: storage.get(WALLET_ADDRESS_KEY).map(WalletAddress::from),
                balance: None,
            },
            app: AppContext {
                current_page: parse_or_default(storage, CURRENT_PAGE_KEY),
            },
            theme: parse_or_default(storage, THEME_KEY),
        }
    }
}

fn parse_or_default<T: FromStr<Err = String> + Default>(storage: &LocalStorage, key: &str) -> T {
    match storage.get(key).map(str::parse::<T>) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            warn!(key = %key, error = %e, "Ignoring unreadable persisted value");
            T::default()
        }
        None => T::default(),
    }
}

/// Dashboard session.
///
/// Cloning is cheap; clones share the same storage, contexts and
/// notifications.
#[derive(Debug, Clone)]
pub struct Session {
    storage: Arc<RwLock<LocalStorage>>,
    state: Arc<RwLock<SessionState>>,
    notifications: Notifications,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(LocalStorage::in_memory())
    }
}

impl Session {
    /// Build a session from whatever `storage` already holds.
    pub fn new(storage: LocalStorage) -> Self {
        let state = SessionState::load(&storage);
        Self {
            storage: Arc::new(RwLock::new(storage)),
            state: Arc::new(RwLock::new(state)),
            notifications: Notifications::new(),
        }
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    pub async fn login(
        &self,
        user_id: impl Into<String>,
        password: impl Into<String>,
    ) -> StorageResult<()> {
        let credentials = Credentials {
            user_id: user_id.into(),
            password: password.into(),
        };
        {
            let mut storage = self.storage.write().await;
            storage.set(USER_ID_KEY, credentials.user_id.as_str())?;
            storage.set(PASSWORD_KEY, credentials.password.as_str())?;
        }
        info!(user_id = %credentials.user_id, "Signed in");
        self.state.write().await.auth.credentials = Some(credentials);
        Ok(())
    }

    pub async fn credentials(&self) -> Option<Credentials> {
        self.state.read().await.auth.credentials.clone()
    }

    pub async fn auth(&self) -> AuthContext {
        self.state.read().await.auth.clone()
    }

    // -------------------------------------------------------------------------
    // Wallet
    // -------------------------------------------------------------------------

    pub async fn connect_wallet(&self, address: WalletAddress) -> StorageResult<()> {
        self.storage
            .write()
            .await
            .set(WALLET_ADDRESS_KEY, address.as_str())?;
        info!(address = %address, "Wallet connected");
        let mut state = self.state.write().await;
        if state.wallet.address.as_ref() != Some(&address) {
            state.wallet.balance = None;
        }
        state.wallet.address = Some(address);
        Ok(())
    }

    pub async fn disconnect_wallet(&self) -> StorageResult<()> {
        self.storage.write().await.remove(WALLET_ADDRESS_KEY)?;
        self.state.write().await.wallet = WalletContext::default();
        Ok(())
    }

    pub async fn wallet_address(&self) -> Option<WalletAddress> {
        self.state.read().await.wallet.address.clone()
    }

    pub async fn set_balance(&self, balance: impl Into<String>) {
        self.state.write().await.wallet.balance = Some(balance.into());
    }

    pub async fn balance(&self) -> Option<String> {
        self.state.read().await.wallet.balance.clone()
    }

    pub async fn wallet(&self) -> WalletContext {
        self.state.read().await.wallet.clone()
    }

    // -------------------------------------------------------------------------
    // App
    // -------------------------------------------------------------------------

    pub async fn navigate(&self, page: Page) -> StorageResult<()> {
        self.storage
            .write()
            .await
            .set(CURRENT_PAGE_KEY, page.as_str())?;
        self.state.write().await.app.current_page = page;
        Ok(())
    }

    pub async fn current_page(&self) -> Page {
        self.state.read().await.app.current_page
    }

    // -------------------------------------------------------------------------
    // Theme
    // -------------------------------------------------------------------------

    pub async fn set_theme(&self, theme: Theme) -> StorageResult<()> {
        self.storage.write().await.set(THEME_KEY, theme.as_str())?;
        self.state.write().await.theme = theme;
        Ok(())
    }

    /// Flip between light and dark, returning the new theme.
    pub async fn toggle_theme(&self) -> StorageResult<Theme> {
        let next = self.theme().await.toggled();
        self.set_theme(next).await?;
        Ok(next)
    }

    pub async fn theme(&self) -> Theme {
        self.state.read().await.theme
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Forget everything except the theme.
    pub async fn logout(&self) -> StorageResult<()> {
        self.storage
            .write()
            .await
            .retain(|key| !key.starts_with(KEY_PREFIX) || key == THEME_KEY)?;

        {
            let mut state = self.state.write().await;
            let theme = state.theme;
            *state = SessionState {
                theme,
                ..SessionState::default()
            };
        }
        self.notifications.clear().await;
        info!("Signed out");
        Ok(())
    }
}
