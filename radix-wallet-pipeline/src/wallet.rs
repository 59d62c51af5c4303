// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use radix_node_api::Address;
use tokio::sync::watch;

/// The account a wallet is currently signing on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
}

/// A device (or software-equivalent) signature over a built transaction.
#[derive(Debug, Clone)]
pub struct SignatureMaterial {
    pub signature: Vec<u8>,
    pub signer_public_key: Vec<u8>,
}

/// Capability the pipeline consumes to turn a built transaction into a
/// signature, without owning the device session itself.
///
/// The pipeline holds a `Wallet`, never the reverse: wiring a `Wallet`
/// implementation that drives a Ledger device is the host application's job,
/// not this crate's.
#[async_trait]
pub trait Wallet: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sign `built_bytes`, optionally disclosing the single non-native
    /// resource HRP referenced by the transaction to the signer.
    async fn sign(
        &self,
        built_bytes: &[u8],
        non_xrd_hrp: Option<&str>,
    ) -> Result<SignatureMaterial, Self::Error>;

    /// A last-value-cached stream of the wallet's currently active account.
    fn observe_active_account(&self) -> watch::Receiver<Account>;
}
