// SPDX-License-Identifier: Apache-2.0

//! Error types shared by every Ledger application built on this device layer.

use thiserror::Error;

/// Errors that can occur while exchanging APDUs with a Ledger device,
/// independent of which application (Radix or otherwise) is installed.
#[derive(Debug, Error)]
pub enum LedgerAppError<E: std::error::Error> {
    /// The underlying transport failed before a status word was even received.
    #[error("transport error: {0}")]
    TransportError(#[from] E),

    /// The device answered with a status word outside the caller's accepted set.
    #[error("device returned status 0x{sw:04X} for ins 0x{ins:02X}: {description}")]
    DeviceStatus {
        /// The raw 16-bit status word.
        sw: u16,
        /// The instruction code of the command that produced this status.
        ins: u8,
        /// Human readable description, when the status word is a known one.
        description: String,
    },

    /// A response field expected to be UTF-8 was not.
    #[error("response contained invalid UTF-8")]
    Utf8,

    /// The device info / app info response did not start with the expected format byte.
    #[error("unexpected response format identifier")]
    InvalidFormatID,

    /// The GET VERSION response did not match any known payload shape.
    #[error("unrecognized GET VERSION response length")]
    InvalidVersion,

    /// A response expected to carry a non-empty signature was empty.
    #[error("device returned an empty signature")]
    NoSignature,

    /// Attempted to stream a zero-length message over a chunked command.
    #[error("cannot stream an empty message")]
    InvalidEmptyMessage,

    /// The message is too long to fit in 255 chunks.
    #[error("message requires more than 255 chunks")]
    InvalidMessageSize,

    /// A chunked send must begin with an `Init` packet.
    #[error("chunked send must start with an Init packet")]
    InvalidChunkPayloadType,
}
