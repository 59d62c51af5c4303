// SPDX-License-Identifier: Apache-2.0

//! Typed async client for the Radix node/gateway REST API.
//!
//! [`NodeApi`] wraps a [`reqwest::Client`] with one method per node
//! operation used by the transaction pipeline: account queries, validator
//! and network introspection, and the build/finalize/submit triad that
//! turns a [`TransactionIntent`] into a [`PendingTransaction`].

pub mod errors;
pub mod types;

pub use errors::{NodeApiError, NodeApiResult};
pub use types::*;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// The subset of node operations the transaction pipeline drives directly.
///
/// Split out from [`NodeApi`]'s inherent methods so the pipeline can be
/// exercised against a fake in tests without making HTTP calls.
#[async_trait]
pub trait NodeFacade: Send + Sync {
    async fn build_transaction(&self, intent: &TransactionIntent) -> NodeApiResult<BuiltTransaction>;
    async fn finalize_transaction(&self, signed: &SignedTransaction) -> NodeApiResult<FinalizedTransaction>;
    async fn submit_signed_transaction(
        &self,
        finalized: &FinalizedTransaction,
    ) -> NodeApiResult<PendingTransaction>;
    async fn transaction_status(&self, tx_id: &str) -> NodeApiResult<TransactionStatus>;
}

#[async_trait]
impl NodeFacade for NodeApi {
    async fn build_transaction(&self, intent: &TransactionIntent) -> NodeApiResult<BuiltTransaction> {
        NodeApi::build_transaction(self, intent).await
    }

    async fn finalize_transaction(&self, signed: &SignedTransaction) -> NodeApiResult<FinalizedTransaction> {
        NodeApi::finalize_transaction(self, signed).await
    }

    async fn submit_signed_transaction(
        &self,
        finalized: &FinalizedTransaction,
    ) -> NodeApiResult<PendingTransaction> {
        NodeApi::submit_signed_transaction(self, finalized).await
    }

    async fn transaction_status(&self, tx_id: &str) -> NodeApiResult<TransactionStatus> {
        NodeApi::transaction_status(self, tx_id).await
    }
}

/// Async client for a single Radix node/gateway endpoint.
#[derive(Debug, Clone)]
pub struct NodeApi {
    client: reqwest::Client,
    base_url: String,
}

impl NodeApi {
    /// Build a client against `base_url` using a default [`reqwest::Client`].
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Build a client against `base_url` using a caller-configured
    /// [`reqwest::Client`] (custom timeouts, proxies, TLS settings, ...).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get<T, F>(&self, path: &str, err: F) -> NodeApiResult<T>
    where
        T: DeserializeOwned,
        F: Fn(reqwest::Error) -> NodeApiError,
    {
        debug!(path, "node api GET");
        let response = self.client.get(self.url(path)).send().await.map_err(&err)?;
        Self::into_json(response, &err).await
    }

    async fn post<B, T, F>(&self, path: &str, body: &B, err: F) -> NodeApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        F: Fn(reqwest::Error) -> NodeApiError,
    {
        debug!(path, "node api POST");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(&err)?;
        Self::into_json(response, &err).await
    }

    async fn into_json<T, F>(response: reqwest::Response, err: &F) -> NodeApiResult<T>
    where
        T: DeserializeOwned,
        F: Fn(reqwest::Error) -> NodeApiError,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NodeApiError::NodeStatus {
                status: status.as_u16(),
                body,
            });
        }
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                NodeApiError::UnexpectedResponse(e.to_string())
            } else {
                err(e)
            }
        })
    }

    /// The numeric identifier of the network this client is pointed at.
    pub async fn network_id(&self) -> NodeApiResult<u8> {
        self.get("/network/id", NodeApiError::NetworkId).await
    }

    /// Resource balances held by `address`.
    pub async fn token_balances_for(&self, address: &Address) -> NodeApiResult<Vec<TokenBalance>> {
        self.get(
            &format!("/account/{}/balances", address.0),
            NodeApiError::TokenBalances,
        )
        .await
    }

    /// One page of `address`'s transaction history, starting after `cursor`.
    pub async fn transaction_history(
        &self,
        address: &Address,
        cursor: Option<&str>,
    ) -> NodeApiResult<TransactionHistoryPage> {
        let path = match cursor {
            Some(cursor) => format!("/account/{}/history?cursor={cursor}", address.0),
            None => format!("/account/{}/history", address.0),
        };
        self.get(&path, NodeApiError::TransactionHistory).await
    }

    /// Metadata for the network's native token.
    pub async fn native_token(&self) -> NodeApiResult<TokenInfo> {
        self.get("/tokens/native", NodeApiError::NativeToken).await
    }

    /// Metadata for an arbitrary resource.
    pub async fn token_info(&self, rri: &Rri) -> NodeApiResult<TokenInfo> {
        self.get(&format!("/tokens/{}", rri.0), NodeApiError::TokenInfo)
            .await
    }

    /// Active stake positions held by `address`.
    pub async fn stakes_for(&self, address: &Address) -> NodeApiResult<Vec<StakePosition>> {
        self.get(
            &format!("/account/{}/stakes", address.0),
            NodeApiError::StakesForAddress,
        )
        .await
    }

    /// Unstake positions still unlocking for `address`.
    pub async fn unstakes_for(&self, address: &Address) -> NodeApiResult<Vec<UnstakePosition>> {
        self.get(
            &format!("/account/{}/unstakes", address.0),
            NodeApiError::UnstakesForAddress,
        )
        .await
    }

    /// The current validator set.
    pub async fn validators(&self) -> NodeApiResult<Vec<Validator>> {
        self.get("/validators", NodeApiError::Validators).await
    }

    /// Detail for a single validator.
    pub async fn lookup_validator(&self, address: &Address) -> NodeApiResult<Validator> {
        self.get(
            &format!("/validators/{}", address.0),
            NodeApiError::LookupValidator,
        )
        .await
    }

    /// Look up a previously submitted transaction by id.
    pub async fn lookup_transaction(&self, tx_id: &str) -> NodeApiResult<TransactionStatus> {
        self.get(
            &format!("/transaction/{tx_id}"),
            NodeApiError::LookupTransaction,
        )
        .await
    }

    /// Current status of a previously submitted transaction.
    pub async fn transaction_status(&self, tx_id: &str) -> NodeApiResult<TransactionStatus> {
        self.get(
            &format!("/transaction/{tx_id}/status"),
            NodeApiError::TransactionStatus,
        )
        .await
    }

    /// Current network throughput, in transactions per second.
    pub async fn network_throughput(&self) -> NodeApiResult<f64> {
        self.get("/network/throughput", NodeApiError::NetworkTxThroughput)
            .await
    }

    /// Current network demand, in transactions per second requested.
    pub async fn network_demand(&self) -> NodeApiResult<f64> {
        self.get("/network/demand", NodeApiError::NetworkTxDemand)
            .await
    }

    /// Ask the node to serialize an intent into a signable instruction
    /// stream.
    pub async fn build_transaction(
        &self,
        intent: &TransactionIntent,
    ) -> NodeApiResult<BuiltTransaction> {
        self.post(
            "/transaction/build",
            intent,
            NodeApiError::BuildTxFromIntent,
        )
        .await
    }

    /// Submit a device signature over a built transaction, receiving back
    /// the node-assigned transaction id.
    pub async fn finalize_transaction(
        &self,
        signed: &SignedTransaction,
    ) -> NodeApiResult<FinalizedTransaction> {
        self.post(
            "/transaction/finalize",
            signed,
            NodeApiError::FinalizeTx,
        )
        .await
    }

    /// Broadcast a finalized transaction to the network.
    pub async fn submit_signed_transaction(
        &self,
        finalized: &FinalizedTransaction,
    ) -> NodeApiResult<PendingTransaction> {
        self.post(
            "/transaction/submit",
            finalized,
            NodeApiError::SubmitSignedTx,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Echo {
        value: u8,
    }

    fn response(status: u16, body: &str) -> reqwest::Response {
        let raw = http::Response::builder()
            .status(status)
            .body(body.as_bytes().to_vec())
            .unwrap();
        reqwest::Response::from(raw)
    }

    #[tokio::test]
    async fn into_json_decodes_a_successful_body() {
        let decoded: Echo =
            NodeApi::into_json(response(200, r#"{"value":7}"#), &NodeApiError::NetworkId)
                .await
                .unwrap();
        assert_eq!(decoded, Echo { value: 7 });
    }

    #[tokio::test]
    async fn into_json_maps_non_2xx_to_node_status() {
        let result: NodeApiResult<Echo> =
            NodeApi::into_json(response(404, "not found"), &NodeApiError::NetworkId).await;
        assert!(matches!(
            result,
            Err(NodeApiError::NodeStatus {
                status: 404,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn into_json_maps_decode_failure_to_unexpected_response() {
        let result: NodeApiResult<Echo> =
            NodeApi::into_json(response(200, "not json"), &NodeApiError::NetworkId).await;
        assert!(matches!(result, Err(NodeApiError::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn request_failure_is_mapped_through_the_operation_s_domain_tag() {
        // Nothing listens on this loopback port, so the request itself
        // fails before a response ever exists, exercising the `err`
        // closure passed into `get`/`post` rather than `into_json`.
        let node = NodeApi::new("http://127.0.0.1:1");
        let result = node.network_id().await;
        assert!(matches!(result, Err(NodeApiError::NetworkId(_))));
    }
}
