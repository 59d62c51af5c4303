// SPDX-License-Identifier: Apache-2.0

//! GET_PUBLIC_KEY command.

use async_trait::async_trait;
use radix_ledger_device_base::AppExt;
use radix_ledger_transport::{APDUCommand, Exchange};

use crate::errors::RadixAppResult;
use crate::instructions::{ins, length, p1_display, CLA};
use crate::types::{GetPublicKeyParams, PublicKeyInfo};
use crate::RadixApp;

/// Retrieve the public key for a derivation path.
#[async_trait]
pub trait GetPublicKey<E: Exchange> {
    /// Send GET_PUBLIC_KEY and parse the device's response.
    async fn get_public_key(
        transport: &E,
        params: GetPublicKeyParams,
    ) -> RadixAppResult<PublicKeyInfo, E::Error>;
}

#[async_trait]
impl<E> GetPublicKey<E> for RadixApp
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn get_public_key(
        transport: &E,
        params: GetPublicKeyParams,
    ) -> RadixAppResult<PublicKeyInfo, E::Error> {
        let p1 = if params.display {
            p1_display::DISPLAY_AND_CONFIRM
        } else {
            p1_display::RETURN_ONLY
        };

        let command = APDUCommand {
            cla: CLA,
            ins: ins::GET_PUBLIC_KEY,
            p1,
            p2: 0x00,
            data: params.path.encode(),
        };

        let response = transport.exchange(&command).await?;
        <Self as AppExt<E>>::handle_response_error(ins::GET_PUBLIC_KEY, &response)?;

        let data = response.data();
        let pubkey_len = length::UNCOMPRESSED_PUBKEY_SIZE;
        let public_key = data[..pubkey_len].to_vec();

        let chain_code = if params.return_chain_code {
            Some(data[pubkey_len..pubkey_len + 32].to_vec())
        } else {
            None
        };

        Ok(PublicKeyInfo {
            public_key,
            chain_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Deref;
    use std::sync::{Arc, Mutex};

    use radix_ledger_transport::APDUAnswer;

    use super::*;
    use crate::hd_path::HdPath;

    #[derive(Clone)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<APDUCommand<Vec<u8>>>>>,
        response: Vec<u8>,
    }

    impl RecordingTransport {
        fn new(response: Vec<u8>) -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                response,
            }
        }
    }

    #[async_trait]
    impl Exchange for RecordingTransport {
        type Error = std::io::Error;
        type AnswerType = Vec<u8>;

        async fn exchange<I>(
            &self,
            command: &APDUCommand<I>,
        ) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
        where
            I: Deref<Target = [u8]> + Send + Sync,
        {
            self.sent.lock().unwrap().push(APDUCommand {
                cla: command.cla,
                ins: command.ins,
                p1: command.p1,
                p2: command.p2,
                data: command.data.to_vec(),
            });
            Ok(APDUAnswer::from_answer(self.response.clone()).unwrap())
        }
    }

    fn default_radix_path() -> HdPath {
        HdPath::new([
            0x8000_0054,
            0x8000_0218,
            0x8000_0000,
            0x0000_0000,
            0x0000_0000,
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn sends_expected_frame_without_display() {
        let mut response = vec![0x04; length::UNCOMPRESSED_PUBKEY_SIZE];
        response.extend_from_slice(&[0x90, 0x00]);
        let transport = RecordingTransport::new(response);

        RadixApp::get_public_key(&transport, GetPublicKeyParams::new(default_radix_path()))
            .await
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let command = &sent[0];
        assert_eq!(command.cla, CLA);
        assert_eq!(command.ins, ins::GET_PUBLIC_KEY);
        assert_eq!(command.p1, p1_display::RETURN_ONLY);
        assert_eq!(command.p2, 0x00);
        assert_eq!(
            command.data,
            vec![
                0x05, //
                0x80, 0x00, 0x00, 0x54, //
                0x80, 0x00, 0x02, 0x18, //
                0x80, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
            ]
        );
    }
}
