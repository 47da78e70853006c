// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Form Validation
//!
//! Checks run on dashboard form input before anything is sent to the
//! backend. A failed check is a [`FormError`], shown next to the form; it
//! never produces a notification or a network call.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::context::Credentials;
use crate::models::WalletAddress;

pub const USER_ID_MIN_LEN: usize = 3;
pub const USER_ID_MAX_LEN: usize = 32;
pub const PASSWORD_MIN_LEN: usize = 6;
/// Heir shares are percentages.
pub const SHARES_TOTAL: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("User ID and password are required")]
    MissingCredentials,

    #[error("User ID must be 3-32 characters of letters, numbers, _ and -")]
    InvalidUserId,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Amount must be a positive number")]
    InvalidAmount,

    #[error("At least one heir is required")]
    NoHeirs,

    #[error("Heir listed more than once: {0}")]
    DuplicateHeir(String),

    #[error("Expected one share per heir ({heirs} heirs, {shares} shares)")]
    ShareCountMismatch { heirs: usize, shares: usize },

    #[error("Invalid share: {0}")]
    InvalidShare(String),

    #[error("Shares must add up to 100, got {0}")]
    SharesTotal(u32),
}

// =============================================================================
// Forms
// =============================================================================

/// Raw input of the create-wallet form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletForm {
    pub user_id: String,
    pub password: String,
}

/// Raw input of the transfer form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferForm {
    pub user_id: String,
    pub password: String,
    pub to_address: String,
    pub amount: String,
}

/// Raw input of the create-will form. Shares are typed as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WillForm {
    pub user_id: String,
    pub password: String,
    pub heirs: Vec<String>,
    pub shares: Vec<String>,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub credentials: Credentials,
    pub to_address: WalletAddress,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWillRequest {
    pub credentials: Credentials,
    pub heirs: Vec<WalletAddress>,
    pub shares: Vec<u32>,
    pub amount: String,
}

impl WalletForm {
    pub fn validate(&self) -> Result<Credentials, FormError> {
        let user_id = self.user_id.trim();
        if user_id.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        validate_user_id(user_id)?;
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(FormError::PasswordTooShort);
        }
        Ok(Credentials {
            user_id: user_id.to_string(),
            password: self.password.clone(),
        })
    }
}

impl TransferForm {
    pub fn validate(&self) -> Result<TransferRequest, FormError> {
        let credentials = require_credentials(&self.user_id, &self.password)?;
        let to_address = validate_address(&self.to_address)?;
        let amount = validate_amount(&self.amount)?;
        Ok(TransferRequest {
            credentials,
            to_address,
            amount,
        })
    }
}

impl WillForm {
    pub fn validate(&self) -> Result<CreateWillRequest, FormError> {
        let credentials = require_credentials(&self.user_id, &self.password)?;

        if self.heirs.iter().all(|h| h.trim().is_empty()) {
            return Err(FormError::NoHeirs);
        }
        let mut seen = HashSet::new();
        let mut heirs = Vec::with_capacity(self.heirs.len());
        for raw in &self.heirs {
            let heir = validate_address(raw)?;
            if !seen.insert(heir.as_str().to_ascii_lowercase()) {
                return Err(FormError::DuplicateHeir(heir.0));
            }
            heirs.push(heir);
        }

        if self.shares.len() != heirs.len() {
            return Err(FormError::ShareCountMismatch {
                heirs: heirs.len(),
                shares: self.shares.len(),
            });
        }
        let shares = self
            .shares
            .iter()
            .map(|raw| match raw.trim().parse::<u32>() {
                Ok(share) if share > 0 => Ok(share),
                _ => Err(FormError::InvalidShare(raw.trim().to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total = shares.iter().fold(0u32, |acc, s| acc.saturating_add(*s));
        if total != SHARES_TOTAL {
            return Err(FormError::SharesTotal(total));
        }

        let amount = validate_amount(&self.amount)?;
        Ok(CreateWillRequest {
            credentials,
            heirs,
            shares,
            amount,
        })
    }
}

// =============================================================================
// Field Checks
// =============================================================================

fn require_credentials(user_id: &str, password: &str) -> Result<Credentials, FormError> {
    let user_id = user_id.trim();
    if user_id.is_empty() || password.is_empty() {
        return Err(FormError::MissingCredentials);
    }
    Ok(Credentials {
        user_id: user_id.to_string(),
        password: password.to_string(),
    })
}

pub fn validate_user_id(user_id: &str) -> Result<(), FormError> {
    let len = user_id.chars().count();
    let allowed = user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !(USER_ID_MIN_LEN..=USER_ID_MAX_LEN).contains(&len) || !allowed {
        return Err(FormError::InvalidUserId);
    }
    Ok(())
}

pub fn validate_address(raw: &str) -> Result<WalletAddress, FormError> {
    let address = WalletAddress::from(raw.trim());
    if !address.is_valid() {
        return Err(FormError::InvalidAddress(raw.trim().to_string()));
    }
    Ok(address)
}

/// Accepts plain decimals such as `10`, `0.5` or `.25`. Returns the trimmed
/// text so the backend receives exactly what the user typed.
pub fn validate_amount(raw: &str) -> Result<String, FormError> {
    let amount = raw.trim();
    let mut dots = 0;
    let mut digits = 0;
    for c in amount.chars() {
        match c {
            '.' => dots += 1,
            c if c.is_ascii_digit() => digits += 1,
            _ => return Err(FormError::InvalidAmount),
        }
    }
    if digits == 0 || dots > 1 {
        return Err(FormError::InvalidAmount);
    }
    match amount.parse::<f64>() {
        Ok(value) if value > 0.0 => Ok(amount.to_string()),
        _ => Err(FormError::InvalidAmount),
    }
}
