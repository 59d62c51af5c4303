// SPDX-License-Identifier: Apache-2.0

//! DO_SIGN_TX command: a two-phase streaming protocol that sends a
//! transaction's metadata followed by its instructions, one frame per
//! instruction, and is the only command that must run against a
//! [`DeviceSession`] rather than a bare transport — its dirty-tracking is
//! what lets a caller detect a SIGN_TX that was abandoned mid-stream.

use async_trait::async_trait;
use radix_ledger_device_base::{AppExt, DeviceSession};
use radix_ledger_transport::{APDUCommand, Exchange};

use crate::errors::RadixAppResult;
use crate::instructions::{ins, p1_sign_tx, p2_sign_tx, CLA};
use crate::types::{SignTxParams, Signature};
use crate::utils::{parse_signature, validate_hrp};
use crate::RadixApp;

fn metadata_frame(params: &SignTxParams) -> APDUCommand<Vec<u8>> {
    let mut data = params.path.encode();
    data.extend_from_slice(&params.tx_byte_count.to_be_bytes());
    data.extend_from_slice(&(params.instructions.len() as u16).to_be_bytes());

    match &params.non_native_hrp {
        Some(hrp) => {
            data.push(hrp.len() as u8);
            data.extend_from_slice(hrp.as_bytes());
        }
        None => data.push(0),
    }

    APDUCommand {
        cla: CLA,
        ins: ins::DO_SIGN_TX,
        p1: p1_sign_tx::METADATA,
        p2: 0x00,
        data,
    }
}

/// Stream a built transaction to the device and sign it.
#[async_trait]
pub trait SignTx<E: Exchange> {
    /// Send the SIGN_TX metadata frame followed by one frame per
    /// instruction, marking `session` dirty for the duration so a caller
    /// that cancels this future mid-stream can detect the device may be
    /// desynchronized.
    async fn sign_tx(
        session: &DeviceSession<E>,
        params: SignTxParams,
    ) -> RadixAppResult<Signature, E::Error>;
}

#[async_trait]
impl<E> SignTx<E> for RadixApp
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn sign_tx(
        session: &DeviceSession<E>,
        params: SignTxParams,
    ) -> RadixAppResult<Signature, E::Error> {
        if let Some(hrp) = &params.non_native_hrp {
            validate_hrp::<E::Error>(hrp)?;
        }

        // Marked dirty up front and only cleared after the stream completes
        // in full: a cancelled or failed stream leaves the device session
        // dirty, per the SIGN_TX cancellation contract.
        session.mark_dirty();

        let response = session.exchange(&metadata_frame(&params)).await?;
        <Self as AppExt<DeviceSession<E>>>::handle_response_error(ins::DO_SIGN_TX, &response)?;

        let last_index = params.instructions.len().saturating_sub(1);
        let mut response = response;
        for (index, instruction) in params.instructions.iter().enumerate() {
            let is_last = index == last_index;
            let command = APDUCommand {
                cla: CLA,
                ins: ins::DO_SIGN_TX,
                p1: p1_sign_tx::INSTRUCTION,
                p2: if is_last {
                    p2_sign_tx::LAST
                } else {
                    p2_sign_tx::NOT_LAST
                },
                data: instruction.clone(),
            };

            response = session.exchange(&command).await?;
            if is_last {
                <Self as AppExt<DeviceSession<E>>>::handle_response_error_signature(
                    ins::DO_SIGN_TX,
                    &response,
                )?;
            } else {
                <Self as AppExt<DeviceSession<E>>>::handle_response_error(
                    ins::DO_SIGN_TX,
                    &response,
                )?;
            }
        }

        let signature = parse_signature(response.data())?;
        session.clear_dirty();
        Ok(signature)
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
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
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
            // A 65-byte recoverable signature plus status word is a valid
            // response to every frame, including intermediate ones the
            // caller ignores the payload of.
            let mut response = vec![0xCC; 65];
            response.extend_from_slice(&[0x90, 0x00]);
            Ok(APDUAnswer::from_answer(response).unwrap())
        }
    }

    #[tokio::test]
    async fn streams_metadata_then_instruction_frames_in_order() {
        let path = HdPath::new([
            0x8000_0054,
            0x8000_0218,
            0x8000_0000,
            0x0000_0000,
            0x0000_0000,
        ])
        .unwrap();
        let transport = RecordingTransport::new();
        let session = DeviceSession::new(transport.clone());

        let params = SignTxParams::new(path, 0x100, vec![vec![0x01, 0x02], vec![0x03]])
            .with_non_native_hrp("foo".to_string());

        RadixApp::sign_tx(&session, params).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);

        let metadata = &sent[0];
        assert_eq!(metadata.p1, p1_sign_tx::METADATA);
        assert_eq!(metadata.p2, 0x00);
        assert_eq!(
            metadata.data,
            vec![
                0x05, //
                0x80, 0x00, 0x00, 0x54, //
                0x80, 0x00, 0x02, 0x18, //
                0x80, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x01, 0x00, // tx_byte_count = 0x100
                0x00, 0x02, // instruction_count = 2
                0x03, 0x66, 0x6F, 0x6F, // hrp "foo"
            ]
        );

        let first_instruction = &sent[1];
        assert_eq!(first_instruction.p1, p1_sign_tx::INSTRUCTION);
        assert_eq!(first_instruction.p2, p2_sign_tx::NOT_LAST);
        assert_eq!(first_instruction.data, vec![0x01, 0x02]);

        let last_instruction = &sent[2];
        assert_eq!(last_instruction.p1, p1_sign_tx::INSTRUCTION);
        assert_eq!(last_instruction.p2, p2_sign_tx::LAST);
        assert_eq!(last_instruction.data, vec![0x03]);

        assert!(!session.is_dirty());
    }
}
