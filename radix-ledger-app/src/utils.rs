// SPDX-License-Identifier: Apache-2.0

//! Small parsing and validation helpers shared across commands.

use crate::errors::RadixAppError;
use crate::types::Signature;

/// Validate a non-native resource HRP fits the SIGN_TX metadata frame's
/// single length-prefix byte. Called before any device I/O, per the
/// metadata frame's precondition.
pub fn validate_hrp<E: std::error::Error>(hrp: &str) -> Result<(), RadixAppError<E>> {
    if hrp.len() > 255 {
        return Err(RadixAppError::HrpTooLong { len: hrp.len() });
    }
    Ok(())
}

/// Parse a recoverable-signature response: `v(1) || r(32) || s(32)`.
pub fn parse_signature<E: std::error::Error>(data: &[u8]) -> Result<Signature, RadixAppError<E>> {
    if data.len() < 65 {
        return Err(RadixAppError::ResponseTooShort {
            expected: "recoverable signature (v, r, s)",
        });
    }
    Ok(Signature {
        v: data[0],
        r: data[1..33].to_vec(),
        s: data[33..65].to_vec(),
    })
}
