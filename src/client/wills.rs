// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Will lifecycle and monitoring endpoints.

use super::{ApiClient, ApiRequest};
use crate::models::{
    AutoExecutionBody, CreateWillBody, CredentialsBody, Envelope, RevokeWillBody, WalletAddress,
    WillExecutionBody,
};

impl ApiClient {
    /// `POST /will/create`. The new index is exposed as `willIndex`.
    pub async fn create_will(
        &self,
        user_id: &str,
        password: &str,
        heirs: &[WalletAddress],
        shares: &[u32],
        amount: &str,
    ) -> Envelope {
        let body = CreateWillBody {
            user_id: user_id.to_string(),
            password: password.to_string(),
            heirs: heirs.to_vec(),
            shares: shares.to_vec(),
            amount: amount.to_string(),
        };
        let mut envelope = self.call(ApiRequest::post(&["will", "create"], &body)).await;
        envelope.canonicalize("willIndex", "index");
        envelope
    }

    /// `GET /will/owner/{ownerAddress}`.
    pub async fn get_all_wills_for_owner(&self, owner: &WalletAddress) -> Envelope {
        self.call(Ok(ApiRequest::get(&["will", "owner", owner.as_str()])))
            .await
    }

    /// `POST /will/activity`: proof-of-life ping that resets inactivity timers.
    pub async fn update_activity(&self, user_id: &str, password: &str) -> Envelope {
        let body = CredentialsBody {
            user_id: user_id.to_string(),
            password: password.to_string(),
        };
        self.call(ApiRequest::post(&["will", "activity"], &body)).await
    }

    /// `POST /will/execute`.
    pub async fn execute_will(
        &self,
        user_id: &str,
        password: &str,
        owner: &WalletAddress,
        will_index: u64,
    ) -> Envelope {
        let body = execution_body(user_id, password, owner, will_index);
        self.call(ApiRequest::post(&["will", "execute"], &body)).await
    }

    /// `POST /will/execute/auto`: platform-triggered execution of a will
    /// whose owner has gone inactive.
    pub async fn execute_will_automatically(
        &self,
        owner: &WalletAddress,
        will_index: u64,
    ) -> Envelope {
        let body = AutoExecutionBody {
            owner_address: owner.clone(),
            will_index,
        };
        self.call(ApiRequest::post(&["will", "execute", "auto"], &body))
            .await
    }

    /// `POST /will/execute/initiate`.
    pub async fn initiate_will_execution(
        &self,
        user_id: &str,
        password: &str,
        owner: &WalletAddress,
        will_index: u64,
    ) -> Envelope {
        let body = execution_body(user_id, password, owner, will_index);
        self.call(ApiRequest::post(&["will", "execute", "initiate"], &body))
            .await
    }

    /// `GET /will/{ownerAddress}/{willIndex}/ready`.
    pub async fn check_will_ready_for_execution(
        &self,
        owner: &WalletAddress,
        will_index: u64,
    ) -> Envelope {
        let index = will_index.to_string();
        self.call(Ok(ApiRequest::get(&["will", owner.as_str(), index.as_str(), "ready"])))
            .await
    }

    /// `POST /will/revoke`.
    pub async fn revoke_will(&self, will_index: u64, user_id: &str, password: &str) -> Envelope {
        let body = RevokeWillBody {
            user_id: user_id.to_string(),
            password: password.to_string(),
            will_index,
        };
        self.call(ApiRequest::post(&["will", "revoke"], &body)).await
    }

    /// `GET /will/monitored`: every will the platform tracks for readiness.
    pub async fn get_monitored_wills(&self) -> Envelope {
        self.call(Ok(ApiRequest::get(&["will", "monitored"]))).await
    }
}

fn execution_body(
    user_id: &str,
    password: &str,
    owner: &WalletAddress,
    will_index: u64,
) -> WillExecutionBody {
    WillExecutionBody {
        user_id: user_id.to_string(),
        password: password.to_string(),
        owner_address: owner.clone(),
        will_index,
    }
}

#[cfg(test)]
mod tests {
    use crate::{client::ApiClient, models::WalletAddress, test_support::spawn_backend};
    use axum::{
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    fn owner() -> WalletAddress {
        "0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12".into()
    }

    fn will_backend() -> Router {
        Router::new()
            .route("/will/create", post(|| async { Json(json!({"index": 4})) }))
            .route(
                "/will/owner/{owner}",
                get(|| async { Json(json!({"wills": [{"willIndex": 0}]})) }),
            )
            .route("/will/activity", post(|| async { Json(json!({})) }))
            .route("/will/execute", post(|| async { Json(json!({"txHash": "0x1"})) }))
            .route("/will/execute/auto", post(|| async { Json(json!({"txHash": "0x2"})) }))
            .route(
                "/will/execute/initiate",
                post(|| async { Json(json!({"message": "Execution initiated"})) }),
            )
            .route(
                "/will/{owner}/{index}/ready",
                get(|| async { Json(json!({"ready": true})) }),
            )
            .route("/will/revoke", post(|| async { Json(json!({"message": "Revoked"})) }))
            .route("/will/monitored", get(|| async { Json(json!([{"willIndex": 1}])) }))
    }

    #[tokio::test]
    async fn create_will_sends_heirs_and_normalizes_index() {
        let backend = spawn_backend(will_backend()).await;
        let heirs = vec![owner()];

        let envelope = ApiClient::new(&backend.origin)
            .create_will("alice", "secret1", &heirs, &[100], "2.5")
            .await;

        assert!(envelope.success);
        assert_eq!(envelope.get("willIndex"), Some(&json!(4)));
        let sent: Value = serde_json::from_str(&backend.hits()[0].body).unwrap();
        assert_eq!(
            sent,
            json!({
                "userId": "alice",
                "password": "secret1",
                "heirs": [owner().0],
                "shares": [100],
                "amount": "2.5"
            })
        );
    }

    #[tokio::test]
    async fn every_will_endpoint_is_reachable() {
        let backend = spawn_backend(will_backend()).await;
        let client = ApiClient::new(&backend.origin);
        let owner = owner();

        assert!(client.get_all_wills_for_owner(&owner).await.success);
        assert!(client.update_activity("alice", "secret1").await.success);
        assert!(client.execute_will("alice", "secret1", &owner, 0).await.success);
        assert!(client.execute_will_automatically(&owner, 0).await.success);
        assert!(
            client
                .initiate_will_execution("alice", "secret1", &owner, 0)
                .await
                .success
        );
        let ready = client.check_will_ready_for_execution(&owner, 7).await;
        assert_eq!(ready.get("ready"), Some(&json!(true)));
        assert!(client.revoke_will(3, "alice", "secret1").await.success);
        let monitored = client.get_monitored_wills().await;
        assert_eq!(monitored.get("data"), Some(&json!([{"willIndex": 1}])));

        let paths: Vec<String> = backend.hits().into_iter().map(|h| h.path).collect();
        assert_eq!(
            paths,
            vec![
                format!("/will/owner/{}", owner.0),
                "/will/activity".to_string(),
                "/will/execute".to_string(),
                "/will/execute/auto".to_string(),
                "/will/execute/initiate".to_string(),
                format!("/will/{}/7/ready", owner.0),
                "/will/revoke".to_string(),
                "/will/monitored".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn revoke_sends_index_and_credentials() {
        let backend = spawn_backend(will_backend()).await;

        ApiClient::new(&backend.origin)
            .revoke_will(3, "alice", "secret1")
            .await;

        let sent: Value = serde_json::from_str(&backend.hits()[0].body).unwrap();
        assert_eq!(
            sent,
            json!({"userId": "alice", "password": "secret1", "willIndex": 3})
        );
    }
}
