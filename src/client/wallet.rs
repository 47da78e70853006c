// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodial wallet endpoints.

use super::{ApiClient, ApiRequest};
use crate::models::{CredentialsBody, Envelope, TransferBody, WalletAddress};

impl ApiClient {
    /// `POST /wallet/create`. The reply's address is exposed as `address`
    /// whether the backend calls it `address` or `walletAddress`.
    pub async fn create_wallet(&self, user_id: &str, password: &str) -> Envelope {
        let body = CredentialsBody {
            user_id: user_id.to_string(),
            password: password.to_string(),
        };
        let mut envelope = self
            .call(ApiRequest::post(&["wallet", "create"], &body))
            .await;
        envelope.canonicalize("address", "walletAddress");
        envelope
    }

    /// `GET /wallet/{userId}/balance`.
    pub async fn get_wallet_balance(&self, user_id: &str) -> Envelope {
        let mut envelope = self
            .call(Ok(ApiRequest::get(&["wallet", user_id, "balance"])))
            .await;
        envelope.canonicalize("balance", "tokenBalance");
        envelope
    }

    /// `POST /wallet/{userId}/transfer`.
    pub async fn transfer_tokens(
        &self,
        user_id: &str,
        password: &str,
        to_address: &WalletAddress,
        amount: &str,
    ) -> Envelope {
        let body = TransferBody {
            password: password.to_string(),
            to_address: to_address.clone(),
            amount: amount.to_string(),
        };
        self.call(ApiRequest::post(&["wallet", user_id, "transfer"], &body))
            .await
    }
}
