// SPDX-License-Identifier: Apache-2.0

//! DO_SIGN_HASH command.

use async_trait::async_trait;
use radix_ledger_device_base::AppExt;
use radix_ledger_transport::{APDUCommand, Exchange};

use crate::errors::RadixAppResult;
use crate::instructions::{ins, p1_display, CLA};
use crate::types::{SignHashParams, Signature};
use crate::utils::parse_signature;
use crate::RadixApp;

/// Sign a pre-computed hash with the device-held key.
#[async_trait]
pub trait SignHash<E: Exchange> {
    /// Send DO_SIGN_HASH and parse the returned signature.
    async fn sign_hash(
        transport: &E,
        params: SignHashParams,
    ) -> RadixAppResult<Signature, E::Error>;
}

#[async_trait]
impl<E> SignHash<E> for RadixApp
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn sign_hash(
        transport: &E,
        params: SignHashParams,
    ) -> RadixAppResult<Signature, E::Error> {
        let p1 = if params.display {
            p1_display::DISPLAY_AND_CONFIRM
        } else {
            p1_display::RETURN_ONLY
        };

        let mut data = params.path.encode();
        data.push(params.hash.len() as u8);
        data.extend_from_slice(&params.hash);

        let command = APDUCommand {
            cla: CLA,
            ins: ins::DO_SIGN_HASH,
            p1,
            p2: 0x00,
            data,
        };

        let response = transport.exchange(&command).await?;
        <Self as AppExt<E>>::handle_response_error_signature(ins::DO_SIGN_HASH, &response)?;

        parse_signature(response.data())
    }
}
