// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Dashboard Actions
//!
//! Every user-facing operation runs through [`Actions`], which keeps one
//! [`Slot`] per operation family and reports outcomes through the session's
//! notification list.
//!
//! ## Operation Flow
//!
//! 1. The family's slot enters `loading` and hands out a ticket.
//! 2. The [`ApiClient`] call runs.
//! 3. A successful envelope settles the slot with the envelope and, for
//!    write operations, pushes a success notification.
//! 4. A failed envelope settles the slot with its message and pushes an
//!    error notification.
//!
//! A completion whose ticket is no longer the slot's newest leaves the slot
//! untouched; its notification is still pushed.
//!
//! ## Slots
//!
//! | Slot | Operations |
//! |------|------------|
//! | `create_wallet` | [`Actions::create_wallet`] |
//! | `create_will` | [`Actions::create_will`] |
//! | `wills` | [`Actions::fetch_wills`] |
//! | `monitored` | [`Actions::fetch_monitored_wills`] |
//! | `activity` | [`Actions::update_activity`] |
//! | `execution` | execute, auto-execute, initiate, ready check, revoke |
//! | `transfer` | [`Actions::transfer_tokens`] |
//! | `balance` | [`Actions::fetch_balance`] |

use std::future::Future;

use serde_json::Value;
use tracing::warn;

use crate::client::ApiClient;
use crate::context::{Credentials, Session};
use crate::forms::{CreateWillRequest, FormError, TransferForm, TransferRequest, WalletForm, WillForm};
use crate::models::{Envelope, WalletAddress, Will};
use crate::views::{self, WillFilter, WillSort};

pub mod slot;

pub use slot::{ApiState, Slot, Ticket};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("No wallet connected")]
    NoWallet,

    /// The backend call failed; carries the message shown to the user.
    #[error("{0}")]
    Failed(String),
}

pub type ActionResult = Result<Envelope, ActionError>;

/// One slot per operation family.
#[derive(Debug, Clone)]
pub struct Slots {
    pub create_wallet: Slot<Envelope>,
    pub create_will: Slot<Envelope>,
    pub wills: Slot<Envelope>,
    pub monitored: Slot<Envelope>,
    pub activity: Slot<Envelope>,
    pub execution: Slot<Envelope>,
    pub transfer: Slot<Envelope>,
    pub balance: Slot<Envelope>,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            create_wallet: Slot::new("create_wallet"),
            create_will: Slot::new("create_will"),
            wills: Slot::new("wills"),
            monitored: Slot::new("monitored"),
            activity: Slot::new("activity"),
            execution: Slot::new("execution"),
            transfer: Slot::new("transfer"),
            balance: Slot::new("balance"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Actions {
    client: ApiClient,
    session: Session,
    slots: Slots,
}

impl Actions {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self {
            client,
            session,
            slots: Slots::default(),
        }
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Run `call` against `slot`, settling it and reporting failures.
    async fn track(
        &self,
        slot: &Slot<Envelope>,
        failure_title: &str,
        call: impl Future<Output = Envelope>,
    ) -> ActionResult {
        let ticket = slot.begin().await;
        let envelope = call.await;

        if envelope.success {
            slot.finish(ticket, Ok(envelope.clone())).await;
            Ok(envelope)
        } else {
            let message = envelope.error_message();
            slot.finish(ticket, Err(message.clone())).await;
            self.session
                .notifications()
                .error(failure_title, message.clone())
                .await;
            Err(ActionError::Failed(message))
        }
    }

    // =========================================================================
    // Wallet
    // =========================================================================

    /// Create a custodial wallet and connect it.
    pub async fn create_wallet(&self, user_id: &str, password: &str) -> ActionResult {
        let envelope = self
            .track(
                &self.slots.create_wallet,
                "Wallet creation failed",
                self.client.create_wallet(user_id, password),
            )
            .await?;

        let address = envelope.str_field("address").map(WalletAddress::from);
        let message = match &address {
            Some(address) => format!("Your wallet address is {address}"),
            None => "Your wallet was created".to_string(),
        };
        self.session
            .notifications()
            .success("Wallet created", message)
            .await;

        if let Some(address) = address {
            if let Err(e) = self.session.connect_wallet(address).await {
                warn!(error = %e, "Failed to persist wallet address");
            }
        }
        Ok(envelope)
    }

    pub async fn submit_wallet(&self, form: &WalletForm) -> ActionResult {
        let Credentials { user_id, password } = form.validate()?;
        self.create_wallet(&user_id, &password).await
    }

    /// Refresh the balance of `user_id`'s wallet. No success notification.
    pub async fn fetch_balance(&self, user_id: &str) -> ActionResult {
        let envelope = self
            .track(
                &self.slots.balance,
                "Could not load balance",
                self.client.get_wallet_balance(user_id),
            )
            .await?;

        match envelope.get("balance") {
            Some(Value::String(balance)) => self.session.set_balance(balance.as_str()).await,
            Some(Value::Number(balance)) => self.session.set_balance(balance.to_string()).await,
            _ => {}
        }
        Ok(envelope)
    }

    /// Send tokens, then refresh the sender's balance.
    pub async fn transfer_tokens(&self, request: &TransferRequest) -> ActionResult {
        let Credentials { user_id, password } = &request.credentials;
        let envelope = self
            .track(
                &self.slots.transfer,
                "Transfer failed",
                self.client
                    .transfer_tokens(user_id, password, &request.to_address, &request.amount),
            )
            .await?;

        self.session
            .notifications()
            .success(
                "Transfer sent",
                format!("Sent {} to {}", request.amount, request.to_address),
            )
            .await;

        // The balance outcome has its own slot and notification.
        let _ = self.fetch_balance(user_id).await;
        Ok(envelope)
    }

    pub async fn submit_transfer(&self, form: &TransferForm) -> ActionResult {
        let request = form.validate()?;
        self.transfer_tokens(&request).await
    }

    // =========================================================================
    // Wills
    // =========================================================================

    pub async fn create_will(&self, request: &CreateWillRequest) -> ActionResult {
        let Credentials { user_id, password } = &request.credentials;
        let envelope = self
            .track(
                &self.slots.create_will,
                "Will creation failed",
                self.client.create_will(
                    user_id,
                    password,
                    &request.heirs,
                    &request.shares,
                    &request.amount,
                ),
            )
            .await?;

        let message = match envelope.get("willIndex") {
            Some(Value::Number(index)) => format!("Will #{index} created"),
            Some(Value::String(index)) => format!("Will #{index} created"),
            _ => "Your will was created".to_string(),
        };
        self.session
            .notifications()
            .success("Will created", message)
            .await;
        Ok(envelope)
    }

    pub async fn submit_will(&self, form: &WillForm) -> ActionResult {
        let request = form.validate()?;
        self.create_will(&request).await
    }

    /// List the connected wallet's wills. Without a connected wallet this
    /// does nothing and returns [`ActionError::NoWallet`].
    pub async fn fetch_wills(&self) -> ActionResult {
        let Some(owner) = self.session.wallet_address().await else {
            return Err(ActionError::NoWallet);
        };
        self.track(
            &self.slots.wills,
            "Could not load wills",
            self.client.get_all_wills_for_owner(&owner),
        )
        .await
    }

    /// The last fetched wills list, filtered and sorted.
    pub async fn wills(&self, filter: WillFilter, sort: WillSort) -> Vec<Will> {
        match self.slots.wills.snapshot().await.data {
            Some(envelope) => views::apply(&views::decode_wills(&envelope), filter, sort),
            None => Vec::new(),
        }
    }

    pub async fn fetch_monitored_wills(&self) -> ActionResult {
        self.track(
            &self.slots.monitored,
            "Could not load monitored wills",
            self.client.get_monitored_wills(),
        )
        .await
    }

    /// Proof-of-life ping.
    pub async fn update_activity(&self, user_id: &str, password: &str) -> ActionResult {
        let envelope = self
            .track(
                &self.slots.activity,
                "Activity update failed",
                self.client.update_activity(user_id, password),
            )
            .await?;
        self.session
            .notifications()
            .success("Activity updated", "Your inactivity timer was reset")
            .await;
        Ok(envelope)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    pub async fn execute_will(
        &self,
        user_id: &str,
        password: &str,
        owner: &WalletAddress,
        will_index: u64,
    ) -> ActionResult {
        let envelope = self
            .track(
                &self.slots.execution,
                "Will execution failed",
                self.client.execute_will(user_id, password, owner, will_index),
            )
            .await?;
        self.session
            .notifications()
            .success("Will executed", format!("Will #{will_index} was executed"))
            .await;
        Ok(envelope)
    }

    pub async fn execute_will_automatically(
        &self,
        owner: &WalletAddress,
        will_index: u64,
    ) -> ActionResult {
        let envelope = self
            .track(
                &self.slots.execution,
                "Automatic execution failed",
                self.client.execute_will_automatically(owner, will_index),
            )
            .await?;
        self.session
            .notifications()
            .success(
                "Will executed",
                format!("Will #{will_index} of {owner} was executed automatically"),
            )
            .await;
        Ok(envelope)
    }

    pub async fn initiate_will_execution(
        &self,
        user_id: &str,
        password: &str,
        owner: &WalletAddress,
        will_index: u64,
    ) -> ActionResult {
        let envelope = self
            .track(
                &self.slots.execution,
                "Could not initiate execution",
                self.client
                    .initiate_will_execution(user_id, password, owner, will_index),
            )
            .await?;
        self.session
            .notifications()
            .success(
                "Execution initiated",
                format!("Execution of will #{will_index} has started"),
            )
            .await;
        Ok(envelope)
    }

    /// Read-only readiness check; failures are reported, success is silent.
    pub async fn check_will_ready(&self, owner: &WalletAddress, will_index: u64) -> ActionResult {
        self.track(
            &self.slots.execution,
            "Readiness check failed",
            self.client.check_will_ready_for_execution(owner, will_index),
        )
        .await
    }

    /// Revoke a will, then reload the wills list.
    pub async fn revoke_will(&self, will_index: u64, user_id: &str, password: &str) -> ActionResult {
        let envelope = self
            .track(
                &self.slots.execution,
                "Revocation failed",
                self.client.revoke_will(will_index, user_id, password),
            )
            .await?;
        self.session
            .notifications()
            .success("Will revoked", format!("Will #{will_index} was revoked"))
            .await;

        let _ = self.fetch_wills().await;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NotificationKind;
    use crate::test_support::{spawn_backend, MockBackend};
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::time::Duration;

    const OWNER: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12";

    async fn actions_for(backend: &MockBackend) -> Actions {
        Actions::new(ApiClient::new(&backend.origin), Session::default())
    }

    async fn kinds(actions: &Actions) -> Vec<NotificationKind> {
        actions
            .session()
            .notifications()
            .list()
            .await
            .into_iter()
            .map(|n| n.kind)
            .collect()
    }

    #[tokio::test]
    async fn create_wallet_success_connects_and_notifies() {
        let backend = spawn_backend(Router::new().route(
            "/wallet/create",
            post(|| async { Json(json!({"address": "0xabc"})) }),
        ))
        .await;
        let actions = actions_for(&backend).await;

        actions.create_wallet("alice", "secret1").await.unwrap();

        let state = actions.slots().create_wallet.snapshot().await;
        assert_eq!(
            state.data.map(|e| e.to_value()),
            Some(json!({"success": true, "address": "0xabc"}))
        );
        assert!(!state.loading);
        assert_eq!(state.error, None);

        let notifications = actions.session().notifications().list().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Success);
        assert!(notifications[0].message.contains("0xabc"));
        assert_eq!(
            actions.session().wallet_address().await,
            Some(WalletAddress::from("0xabc"))
        );
    }

    #[tokio::test]
    async fn failed_transfer_skips_balance_refresh() {
        let backend = spawn_backend(
            Router::new()
                .route(
                    "/wallet/{user_id}/transfer",
                    post(|| async {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"message": "insufficient funds"})),
                        )
                    }),
                )
                .route(
                    "/wallet/{user_id}/balance",
                    get(|| async { Json(json!({"balance": "1"})) }),
                ),
        )
        .await;
        let actions = actions_for(&backend).await;
        let form = TransferForm {
            user_id: "alice".into(),
            password: "secret1".into(),
            to_address: OWNER.into(),
            amount: "10".into(),
        };

        let err = actions.submit_transfer(&form).await.unwrap_err();
        assert_eq!(err, ActionError::Failed("insufficient funds".into()));

        assert_eq!(
            actions.slots().transfer.snapshot().await,
            ApiState::failed("insufficient funds")
        );
        assert_eq!(kinds(&actions).await, vec![NotificationKind::Error]);
        assert_eq!(backend.hits_to("/wallet/alice/balance"), 0);
    }

    #[tokio::test]
    async fn successful_transfer_refreshes_balance() {
        let backend = spawn_backend(
            Router::new()
                .route(
                    "/wallet/{user_id}/transfer",
                    post(|| async { Json(json!({"txHash": "0x1"})) }),
                )
                .route(
                    "/wallet/{user_id}/balance",
                    get(|| async { Json(json!({"tokenBalance": "90"})) }),
                ),
        )
        .await;
        let actions = actions_for(&backend).await;
        let form = TransferForm {
            user_id: "alice".into(),
            password: "secret1".into(),
            to_address: OWNER.into(),
            amount: "10".into(),
        };

        actions.submit_transfer(&form).await.unwrap();

        assert_eq!(backend.hits_to("/wallet/alice/balance"), 1);
        assert_eq!(actions.session().balance().await.as_deref(), Some("90"));
        // Balance reads are silent on success.
        assert_eq!(kinds(&actions).await, vec![NotificationKind::Success]);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_backend() {
        let backend = spawn_backend(Router::new()).await;
        let actions = actions_for(&backend).await;
        let form = TransferForm {
            user_id: "alice".into(),
            password: "secret1".into(),
            to_address: "0x123".into(),
            amount: "10".into(),
        };

        let err = actions.submit_transfer(&form).await.unwrap_err();
        assert!(matches!(err, ActionError::Form(FormError::InvalidAddress(_))));
        assert_eq!(backend.hit_count(), 0);
        assert!(actions.slots().transfer.snapshot().await.is_idle());
        assert!(actions.session().notifications().is_empty().await);
    }

    #[tokio::test]
    async fn fetch_wills_without_wallet_is_a_no_op() {
        let backend = spawn_backend(Router::new()).await;
        let actions = actions_for(&backend).await;

        assert_eq!(actions.fetch_wills().await, Err(ActionError::NoWallet));
        assert!(actions.slots().wills.snapshot().await.is_idle());
        assert_eq!(backend.hit_count(), 0);
    }

    #[tokio::test]
    async fn revoke_success_refetches_wills() {
        let backend = spawn_backend(
            Router::new()
                .route("/will/revoke", post(|| async { Json(json!({"message": "Revoked"})) }))
                .route(
                    "/will/owner/{owner}",
                    get(|| async {
                        Json(json!({"wills": [
                            {"willIndex": 3, "amount": "1", "status": "revoked"},
                            {"willIndex": 4, "amount": "2", "status": "active"}
                        ]}))
                    }),
                ),
        )
        .await;
        let actions = actions_for(&backend).await;
        actions.session().connect_wallet(OWNER.into()).await.unwrap();

        actions.revoke_will(3, "alice", "secret1").await.unwrap();

        assert_eq!(kinds(&actions).await, vec![NotificationKind::Success]);
        assert_eq!(backend.hits_to("/will/owner/"), 1);
        let active = actions.wills(WillFilter::Active, WillSort::Index).await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].will_index, 4);
    }

    #[tokio::test]
    async fn create_will_reports_index() {
        let backend = spawn_backend(Router::new().route(
            "/will/create",
            post(|| async { Json(json!({"index": 5})) }),
        ))
        .await;
        let actions = actions_for(&backend).await;
        let form = WillForm {
            user_id: "alice".into(),
            password: "secret1".into(),
            heirs: vec![OWNER.into()],
            shares: vec!["100".into()],
            amount: "1".into(),
        };

        actions.submit_will(&form).await.unwrap();

        let notifications = actions.session().notifications().list().await;
        assert_eq!(notifications[0].message, "Will #5 created");
    }

    #[tokio::test]
    async fn concurrent_balance_fetches_settle_once() {
        let backend = spawn_backend(Router::new().route(
            "/wallet/{user_id}/balance",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Json(json!({"balance": "7"}))
            }),
        ))
        .await;
        let actions = actions_for(&backend).await;

        let (first, second) = tokio::join!(
            actions.fetch_balance("alice"),
            actions.fetch_balance("alice")
        );
        assert!(first.is_ok());
        assert!(second.is_ok());

        let state = actions.slots().balance.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(
            state.data.map(|e| e.to_value()),
            Some(json!({"success": true, "balance": "7"}))
        );
        assert!(actions.session().notifications().is_empty().await);
    }

    #[tokio::test]
    async fn execution_family_shares_one_slot() {
        let backend = spawn_backend(
            Router::new()
                .route("/will/execute", post(|| async { Json(json!({"txHash": "0x1"})) }))
                .route(
                    "/will/{owner}/{index}/ready",
                    get(|| async {
                        (StatusCode::NOT_FOUND, Json(json!({"error": "Will not found"})))
                    }),
                ),
        )
        .await;
        let actions = actions_for(&backend).await;
        let owner = WalletAddress::from(OWNER);

        actions
            .execute_will("alice", "secret1", &owner, 1)
            .await
            .unwrap();
        assert!(actions.slots().execution.snapshot().await.data.is_some());

        let err = actions.check_will_ready(&owner, 9).await.unwrap_err();
        assert_eq!(err.to_string(), "Will not found");
        assert_eq!(
            actions.slots().execution.snapshot().await,
            ApiState::failed("Will not found")
        );
        assert_eq!(
            kinds(&actions).await,
            vec![NotificationKind::Error, NotificationKind::Success]
        );
    }

    #[tokio::test]
    async fn stale_failure_still_notifies_but_keeps_newer_state() {
        let backend = spawn_backend(Router::new().route(
            "/will/execute",
            post(|Json(body): Json<Value>| async move {
                if body["willIndex"] == json!(1) {
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"message": "execution reverted"})),
                    )
                } else {
                    (StatusCode::OK, Json(json!({"txHash": "0x2"})))
                }
            }),
        ))
        .await;
        let actions = actions_for(&backend).await;
        let owner = WalletAddress::from(OWNER);

        let (older, newer) = tokio::join!(
            actions.execute_will("alice", "secret1", &owner, 1),
            async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                actions.execute_will("alice", "secret1", &owner, 2).await
            }
        );
        assert_eq!(older, Err(ActionError::Failed("execution reverted".into())));
        assert!(newer.is_ok());

        let state = actions.slots().execution.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(
            state.data.map(|e| e.to_value()),
            Some(json!({"success": true, "txHash": "0x2"}))
        );

        let notifications = actions.session().notifications().list().await;
        assert_eq!(
            notifications.iter().map(|n| n.kind).collect::<Vec<_>>(),
            vec![NotificationKind::Error, NotificationKind::Success]
        );
        assert_eq!(notifications[0].message, "execution reverted");
        assert_eq!(notifications[1].message, "Will #2 was executed");
    }
}
