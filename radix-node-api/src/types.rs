// SPDX-License-Identifier: Apache-2.0

//! Data model shared by every node/gateway operation.

use serde::{Deserialize, Serialize};

/// A Radix component/account address, Bech32-encoded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

/// A Radix Resource Identifier. `"xrd"` denotes the network's native token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rri(pub String);

impl Rri {
    /// Whether this RRI names the native token.
    pub fn is_native(&self) -> bool {
        self.0 == "xrd"
    }
}

/// A single transfer within a transaction intent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferAction {
    pub to: Address,
    pub resource: Rri,
    pub amount: String,
}

/// A validator stake action within a transaction intent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakeAction {
    pub validator: Address,
    pub amount: String,
}

/// A validator unstake action within a transaction intent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnstakeAction {
    pub validator: Address,
    pub amount: String,
}

/// One action within a transaction intent's ordered action list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionAction {
    Transfer(TransferAction),
    Stake(StakeAction),
    Unstake(UnstakeAction),
    Message(String),
}

/// A transaction intent, produced by an external builder collaborator and
/// consumed by [`crate::NodeApi::build_transaction`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionIntent {
    pub sender: Address,
    pub actions: Vec<TransactionAction>,
}

impl TransactionIntent {
    /// The distinct non-native resource names referenced by this intent's
    /// transfer actions, in first-seen order.
    pub fn distinct_non_native_resources(&self) -> Vec<&Rri> {
        let mut seen = Vec::new();
        for action in &self.actions {
            if let TransactionAction::Transfer(transfer) = action {
                if !transfer.resource.is_native() && !seen.contains(&&transfer.resource) {
                    seen.push(&transfer.resource);
                }
            }
        }
        seen
    }
}

/// A node-serialized instruction stream ready for signing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuiltTransaction {
    /// The full serialized transaction, opaque to this crate.
    pub bytes: Vec<u8>,
    /// The same instruction stream, pre-split into per-frame payloads for
    /// the Tx Chunker — sparing callers from parsing the manifest.
    pub instructions: Vec<Vec<u8>>,
}

impl BuiltTransaction {
    pub fn byte_count(&self) -> u32 {
        self.bytes.len() as u32
    }

    pub fn instruction_count(&self) -> u16 {
        self.instructions.len() as u16
    }
}

/// A built transaction plus the device's signature over it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub built_transaction_bytes: Vec<u8>,
    pub signature: Vec<u8>,
    pub signer_public_key: Vec<u8>,
}

/// A signed transaction plus the node-assigned transaction identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalizedTransaction {
    pub signed: SignedTransaction,
    pub tx_id: String,
}

/// A finalized transaction accepted by the submit endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub tx_id: String,
}

/// Lifecycle status of a submitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// The status of a previously submitted transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub tx_id: String,
    pub status: TxStatus,
}

/// Balance of a single resource held by an account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub rri: Rri,
    pub amount: String,
}

/// Metadata describing a fungible resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub rri: Rri,
    pub name: String,
    pub symbol: String,
    pub granularity: String,
}

/// A single page of an account's transaction history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionHistoryPage {
    pub items: Vec<TransactionStatus>,
    pub next_cursor: Option<String>,
}

/// A stake held against a validator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakePosition {
    pub validator: Address,
    pub amount: String,
}

/// An in-progress unstake against a validator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnstakePosition {
    pub validator: Address,
    pub amount: String,
    pub epochs_until_unlocked: u64,
}

/// A network validator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub name: Option<String>,
    pub total_stake: String,
    pub owner_stake: String,
}
