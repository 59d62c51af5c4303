// SPDX-License-Identifier: Apache-2.0

//! DO_KEY_EXCHANGE command.

use async_trait::async_trait;
use radix_ledger_device_base::AppExt;
use radix_ledger_transport::{APDUCommand, Exchange};

use crate::errors::RadixAppResult;
use crate::instructions::{ins, p1_display, CLA};
use crate::types::{KeyExchangeParams, SharedSecret};
use crate::RadixApp;

/// Perform an on-device ECDH key exchange.
#[async_trait]
pub trait KeyExchange<E: Exchange> {
    /// Send DO_KEY_EXCHANGE and parse the returned shared secret.
    async fn key_exchange(
        transport: &E,
        params: KeyExchangeParams,
    ) -> RadixAppResult<SharedSecret, E::Error>;
}

#[async_trait]
impl<E> KeyExchange<E> for RadixApp
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn key_exchange(
        transport: &E,
        params: KeyExchangeParams,
    ) -> RadixAppResult<SharedSecret, E::Error> {
        let p1 = if params.display {
            p1_display::DISPLAY_AND_CONFIRM
        } else {
            p1_display::RETURN_ONLY
        };

        let mut data = params.path.encode();
        data.push(params.counterparty_public_key.len() as u8);
        data.extend_from_slice(&params.counterparty_public_key);

        let command = APDUCommand {
            cla: CLA,
            ins: ins::DO_KEY_EXCHANGE,
            p1,
            p2: 0x00,
            data,
        };

        let response = transport.exchange(&command).await?;
        <Self as AppExt<E>>::handle_response_error(ins::DO_KEY_EXCHANGE, &response)?;

        Ok(SharedSecret {
            secret: response.data().to_vec(),
        })
    }
}
