// SPDX-License-Identifier: Apache-2.0

//! Core data types for the Radix application.

use serde::{Deserialize, Serialize};

use crate::hd_path::HdPath;

/// Public key returned by GET_PUBLIC_KEY.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyInfo {
    /// SEC1-uncompressed secp256k1 public key (65 bytes).
    pub public_key: Vec<u8>,
    /// Chain code (32 bytes), present only when requested.
    pub chain_code: Option<Vec<u8>>,
}

/// Shared secret returned by DO_KEY_EXCHANGE.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedSecret {
    /// Raw ECDH shared secret bytes.
    pub secret: Vec<u8>,
}

/// Recoverable ECDSA signature returned by DO_SIGN_HASH and DO_SIGN_TX.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Recovery id.
    pub v: u8,
    /// Signature component r (32 bytes).
    pub r: Vec<u8>,
    /// Signature component s (32 bytes).
    pub s: Vec<u8>,
}

/// Parameters for GET_PUBLIC_KEY.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetPublicKeyParams {
    /// Derivation path of the key to retrieve.
    pub path: HdPath,
    /// Display the path on-device and require confirmation.
    pub display: bool,
    /// Also return the chain code.
    pub return_chain_code: bool,
}

impl GetPublicKeyParams {
    /// Start with display and chain code both disabled.
    pub fn new(path: HdPath) -> Self {
        Self {
            path,
            display: false,
            return_chain_code: false,
        }
    }

    /// Require on-device display and confirmation.
    pub fn with_display(mut self) -> Self {
        self.display = true;
        self
    }

    /// Request the chain code alongside the public key.
    pub fn with_chain_code(mut self) -> Self {
        self.return_chain_code = true;
        self
    }
}

/// Parameters for DO_KEY_EXCHANGE.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyExchangeParams {
    /// Derivation path of our side of the exchange.
    pub path: HdPath,
    /// SEC1-uncompressed counterparty public key (65 bytes).
    pub counterparty_public_key: Vec<u8>,
    /// Display the path and counterparty key on-device before exchanging.
    pub display: bool,
}

impl KeyExchangeParams {
    /// Start with display disabled.
    pub fn new(path: HdPath, counterparty_public_key: Vec<u8>) -> Self {
        Self {
            path,
            counterparty_public_key,
            display: false,
        }
    }

    /// Require on-device display and confirmation.
    pub fn with_display(mut self) -> Self {
        self.display = true;
        self
    }
}

/// Parameters for DO_SIGN_HASH.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignHashParams {
    /// Derivation path of the signing key.
    pub path: HdPath,
    /// Hash to sign.
    pub hash: Vec<u8>,
    /// Display the path and hash on-device before signing.
    pub display: bool,
}

impl SignHashParams {
    /// Start with display disabled.
    pub fn new(path: HdPath, hash: Vec<u8>) -> Self {
        Self {
            path,
            hash,
            display: false,
        }
    }

    /// Require on-device display and confirmation.
    pub fn with_display(mut self) -> Self {
        self.display = true;
        self
    }
}

/// Parameters for DO_SIGN_TX: a built transaction's raw byte count plus its
/// instruction stream, split into per-frame payloads by the caller (the Node
/// Facade hands back instructions already split).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignTxParams {
    /// Derivation path of the signing key.
    pub path: HdPath,
    /// Total byte count of the built transaction.
    pub tx_byte_count: u32,
    /// The transaction's instructions, in order, already split into frames.
    pub instructions: Vec<Vec<u8>>,
    /// Bech32 human-readable prefix of the single non-native resource
    /// referenced by the transaction, if any.
    pub non_native_hrp: Option<String>,
}

impl SignTxParams {
    /// Build SIGN_TX parameters from a path, the transaction's total byte
    /// count, and its already-split instruction stream.
    pub fn new(path: HdPath, tx_byte_count: u32, instructions: Vec<Vec<u8>>) -> Self {
        Self {
            path,
            tx_byte_count,
            instructions,
            non_native_hrp: None,
        }
    }

    /// Attach the single non-native resource HRP referenced by the transaction.
    pub fn with_non_native_hrp(mut self, hrp: String) -> Self {
        self.non_native_hrp = Some(hrp);
        self
    }
}
