// SPDX-License-Identifier: Apache-2.0

//! Radix application APDU commands for Ledger hardware wallets.
//!
//! This crate implements the host side of the Radix app's APDU protocol:
//! public key retrieval, ECDH key exchange, hash signing, and the streaming
//! transaction-signing flow. It builds on [`radix_ledger_device_base`] for
//! generic device session handling and [`radix_ledger_transport`] for the
//! transport abstraction.

use async_trait::async_trait;
use radix_ledger_device_base::{App, DeviceSession};
use radix_ledger_transport::Exchange;

pub mod commands;
pub mod errors;
pub mod hd_path;
pub mod instructions;
pub mod types;
pub mod utils;

pub use commands::*;
pub use errors::*;
pub use hd_path::{HdPath, HdPathDecodeError, InvalidHdPath};
pub use types::*;

/// Radix app marker implementing `App` for its APDU class byte.
#[derive(Debug, Clone, Copy)]
pub struct RadixApp;

impl App for RadixApp {
    /// CLA for the Radix app on Ledger.
    const CLA: u8 = instructions::CLA;
}

/// High-level Radix application client.
///
/// Wraps a [`DeviceSession`] so that SIGN_TX's dirty-tracking is always in
/// effect, and exposes every command as a plain method.
#[derive(Debug)]
pub struct RadixLedgerApp<E> {
    session: DeviceSession<E>,
}

impl<E> RadixLedgerApp<E> {
    /// Wrap a transport, serializing access to it behind a device session.
    pub fn new(transport: E) -> Self {
        Self {
            session: DeviceSession::new(transport),
        }
    }

    /// Whether the last SIGN_TX stream may have left the device mid-APDU.
    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }
}

#[async_trait]
impl<E> GetPublicKey<E> for RadixLedgerApp<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn get_public_key(
        transport: &E,
        params: GetPublicKeyParams,
    ) -> RadixAppResult<PublicKeyInfo, E::Error> {
        RadixApp::get_public_key(transport, params).await
    }
}

#[async_trait]
impl<E> KeyExchange<E> for RadixLedgerApp<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn key_exchange(
        transport: &E,
        params: KeyExchangeParams,
    ) -> RadixAppResult<SharedSecret, E::Error> {
        RadixApp::key_exchange(transport, params).await
    }
}

#[async_trait]
impl<E> SignHash<E> for RadixLedgerApp<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn sign_hash(
        transport: &E,
        params: SignHashParams,
    ) -> RadixAppResult<Signature, E::Error> {
        RadixApp::sign_hash(transport, params).await
    }
}

#[async_trait]
impl<E> GetAppName<E> for RadixLedgerApp<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn get_app_name(transport: &E) -> RadixAppResult<String, E::Error> {
        RadixApp::get_app_name(transport).await
    }
}

impl<E> RadixLedgerApp<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    /// Query the installed app's version.
    pub async fn get_version(
        &self,
    ) -> Result<
        radix_ledger_device_base::Version,
        radix_ledger_device_base::LedgerAppError<E::Error>,
    > {
        <RadixApp as radix_ledger_device_base::AppExt<DeviceSession<E>>>::get_version(
            &self.session,
        )
        .await
    }

    /// Retrieve the installed app's name.
    pub async fn get_app_name(&self) -> RadixAppResult<String, E::Error> {
        RadixApp::get_app_name(&self.session).await
    }

    /// Retrieve the public key for a derivation path.
    pub async fn get_public_key(
        &self,
        params: GetPublicKeyParams,
    ) -> RadixAppResult<PublicKeyInfo, E::Error> {
        RadixApp::get_public_key(&self.session, params).await
    }

    /// Perform an on-device ECDH key exchange.
    pub async fn key_exchange(
        &self,
        params: KeyExchangeParams,
    ) -> RadixAppResult<SharedSecret, E::Error> {
        RadixApp::key_exchange(&self.session, params).await
    }

    /// Sign a pre-computed hash with the device-held key.
    pub async fn sign_hash(&self, params: SignHashParams) -> RadixAppResult<Signature, E::Error> {
        RadixApp::sign_hash(&self.session, params).await
    }

    /// Stream a built transaction to the device and sign it.
    ///
    /// Marks the underlying session dirty for the duration of the stream;
    /// see [`RadixLedgerApp::is_dirty`].
    pub async fn sign_tx(&self, params: SignTxParams) -> RadixAppResult<Signature, E::Error> {
        RadixApp::sign_tx(&self.session, params).await
    }
}
