// SPDX-License-Identifier: Apache-2.0

//! Error types for the Radix application.

use radix_ledger_device_base::LedgerAppError;
use thiserror::Error;

use crate::hd_path::InvalidHdPath;

/// Radix application specific errors.
#[derive(Debug, Error)]
pub enum RadixAppError<E: std::error::Error> {
    /// Error from the underlying device session or transport.
    #[error(transparent)]
    Transport(#[from] LedgerAppError<E>),

    /// The supplied HD path does not derive Radix's hardened coin type.
    #[error(transparent)]
    InvalidHdPath(#[from] InvalidHdPath),

    /// A SIGN_TX metadata frame's HRP would exceed the 255-byte frame limit.
    #[error("non-native resource HRP is {len} bytes, exceeding the 255-byte frame limit")]
    HrpTooLong {
        /// The offending HRP's length.
        len: usize,
    },

    /// A response payload was shorter than the field layout it was parsed as.
    #[error("response too short to contain {expected}")]
    ResponseTooShort {
        /// Description of the field that could not be read.
        expected: &'static str,
    },

    /// A response field expected to be UTF-8 was not.
    #[error("response contained invalid UTF-8")]
    InvalidUtf8,
}

/// Result type alias for Radix application operations.
pub type RadixAppResult<T, E> = Result<T, RadixAppError<E>>;
