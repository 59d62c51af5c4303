// SPDX-License-Identifier: Apache-2.0

//! GET_APP_NAME command.

use async_trait::async_trait;
use radix_ledger_device_base::AppExt;
use radix_ledger_transport::{APDUCommand, Exchange};

use crate::errors::{RadixAppError, RadixAppResult};
use crate::instructions::{ins, CLA};
use crate::RadixApp;

/// Retrieve the installed application's name.
#[async_trait]
pub trait GetAppName<E: Exchange> {
    /// Send GET_APP_NAME and decode the UTF-8 response.
    async fn get_app_name(transport: &E) -> RadixAppResult<String, E::Error>;
}

#[async_trait]
impl<E> GetAppName<E> for RadixApp
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn get_app_name(transport: &E) -> RadixAppResult<String, E::Error> {
        let command = APDUCommand {
            cla: CLA,
            ins: ins::GET_APP_NAME,
            p1: 0x00,
            p2: 0x00,
            data: Vec::new(),
        };

        let response = transport.exchange(&command).await?;
        <Self as AppExt<E>>::handle_response_error(ins::GET_APP_NAME, &response)?;

        String::from_utf8(response.data().to_vec()).map_err(|_| RadixAppError::InvalidUtf8)
    }
}
