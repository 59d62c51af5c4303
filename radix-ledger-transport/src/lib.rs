// SPDX-License-Identifier: Apache-2.0

//! Transport abstraction for talking to a Radix Ledger device.
//!
//! This crate defines only the [`Exchange`] capability; concrete transports
//! (HID, a mock for tests, a relay over a remote bridge) live in their own
//! crates and implement it.

use std::ops::Deref;

pub use async_trait::async_trait;
pub use radix_ledger_apdu::{APDUAnswer, APDUCommand, APDUErrorCode};

/// Use to talk to the Ledger device.
#[async_trait]
pub trait Exchange {
    /// Error defined by the transport used.
    type Error;

    /// The concrete type containing the `APDUAnswer`.
    type AnswerType: Deref<Target = [u8]> + Send;

    /// Send a command over the transport and retrieve an answer or a transport error.
    async fn exchange<I>(
        &self,
        command: &APDUCommand<I>,
    ) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync;
}
