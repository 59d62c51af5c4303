// SPDX-License-Identifier: Apache-2.0

//! APDU command and answer types shared by the transport and application
//! layers of the Radix Ledger SDK.
//!
//! This crate carries no I/O of its own: it only knows how to serialize a
//! command into the wire format a Ledger device expects, and how to parse
//! the raw bytes a device hands back into a status word plus payload.

use std::fmt;
use std::ops::Deref;

/// A single APDU command frame: `CLA INS P1 P2 LC DATA`.
///
/// `I` is generic over anything that derefs to a byte slice so callers can
/// pass an owned `Vec<u8>` or a borrowed slice without forcing an allocation
/// at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct APDUCommand<I> {
    /// Instruction class.
    pub cla: u8,
    /// Instruction code.
    pub ins: u8,
    /// First instruction parameter.
    pub p1: u8,
    /// Second instruction parameter.
    pub p2: u8,
    /// Command payload, at most 255 bytes.
    pub data: I,
}

impl<I> APDUCommand<I>
where
    I: Deref<Target = [u8]>,
{
    /// Serialize this command to the wire format `CLA INS P1 P2 LC DATA`.
    ///
    /// Panics if `data` is longer than 255 bytes; callers that stream
    /// arbitrarily long payloads are expected to chunk ahead of this call.
    pub fn serialize(&self) -> Vec<u8> {
        assert!(self.data.len() <= 255, "APDU data exceeds 255 bytes");

        let mut out = Vec::with_capacity(5 + self.data.len());
        out.push(self.cla);
        out.push(self.ins);
        out.push(self.p1);
        out.push(self.p2);
        out.push(self.data.len() as u8);
        out.extend_from_slice(&self.data);
        out
    }
}

/// A parsed device response: payload bytes plus a trailing 16-bit status word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct APDUAnswer<T> {
    answer: T,
}

/// Returned by [`APDUAnswer::from_answer`] when the raw response is shorter
/// than the mandatory two-byte status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("APDU answer shorter than the 2-byte status word")]
pub struct AnswerTooShort;

impl<T> APDUAnswer<T>
where
    T: Deref<Target = [u8]>,
{
    /// Wrap a raw response buffer, validating it carries at least a status word.
    pub fn from_answer(answer: T) -> Result<Self, AnswerTooShort> {
        if answer.len() < 2 {
            return Err(AnswerTooShort);
        }
        Ok(Self { answer })
    }

    /// The response payload, excluding the trailing status word.
    pub fn data(&self) -> &[u8] {
        &self.answer[..self.answer.len() - 2]
    }

    /// The raw 16-bit status word (`SW1 SW2`), big-endian.
    pub fn retcode(&self) -> u16 {
        let len = self.answer.len();
        u16::from_be_bytes([self.answer[len - 2], self.answer[len - 1]])
    }

    /// The status word decoded into a known [`APDUErrorCode`], or the raw
    /// status word itself when it isn't one this crate recognizes.
    pub fn error_code(&self) -> Result<APDUErrorCode, u16> {
        let sw = self.retcode();
        APDUErrorCode::try_from(sw).map_err(|_| sw)
    }
}

macro_rules! apdu_error_codes {
    ($( $variant:ident = $value:expr => $description:expr ),+ $(,)?) => {
        /// Status words recognized by this SDK. `NoError` (`0x9000`) is the
        /// only code that indicates success; everything else is a failure
        /// of some kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum APDUErrorCode {
            $( $variant = $value, )+
        }

        impl APDUErrorCode {
            /// Human-readable description of the status word, independent of
            /// any particular application's own status-word vocabulary.
            pub fn description(&self) -> &'static str {
                match self {
                    $( APDUErrorCode::$variant => $description, )+
                }
            }
        }

        impl TryFrom<u16> for APDUErrorCode {
            type Error = ();

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(APDUErrorCode::$variant), )+
                    _ => Err(()),
                }
            }
        }
    };
}

apdu_error_codes! {
    NoError = 0x9000 => "success",
    ExecutionError = 0x6400 => "execution error",
    WrongLength = 0x6700 => "wrong length",
    EmptyBuffer = 0x6982 => "empty buffer",
    OutputBufferTooSmall = 0x6983 => "output buffer too small",
    DataInvalid = 0x6984 => "data invalid",
    ConditionsNotSatisfied = 0x6985 => "conditions not satisfied",
    CommandNotAllowed = 0x6986 => "command not allowed",
    BadKeyHandle = 0x6A80 => "bad key handle",
    InvalidP1P2 = 0x6B00 => "invalid P1/P2",
    InsNotSupported = 0x6D00 => "instruction not supported",
    ClaNotSupported = 0x6E00 => "class not supported",
    UnknownError = 0x6F00 => "unknown error",
    SignVerifyError = 0x6F01 => "sign/verify error",
}

impl fmt::Display for APDUErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X})", self.description(), *self as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_header_and_length_prefix() {
        let cmd = APDUCommand {
            cla: 0xAA,
            ins: 0x08,
            p1: 0x00,
            p2: 0x00,
            data: vec![1, 2, 3],
        };
        assert_eq!(cmd.serialize(), vec![0xAA, 0x08, 0x00, 0x00, 3, 1, 2, 3]);
    }

    #[test]
    fn empty_data_serializes_to_zero_length() {
        let cmd: APDUCommand<Vec<u8>> = APDUCommand {
            cla: 0xAA,
            ins: 0x00,
            p1: 0,
            p2: 0,
            data: vec![],
        };
        assert_eq!(cmd.serialize(), vec![0xAA, 0x00, 0x00, 0x00, 0]);
    }

    #[test]
    fn answer_too_short_is_rejected() {
        assert!(APDUAnswer::from_answer(vec![0x90u8]).is_err());
    }

    #[test]
    fn answer_splits_data_from_status_word() {
        let answer = APDUAnswer::from_answer(vec![0xDE, 0xAD, 0x90, 0x00]).unwrap();
        assert_eq!(answer.data(), &[0xDE, 0xAD]);
        assert_eq!(answer.retcode(), 0x9000);
        assert_eq!(answer.error_code(), Ok(APDUErrorCode::NoError));
    }

    #[test]
    fn unrecognized_status_word_is_surfaced_raw() {
        let answer = APDUAnswer::from_answer(vec![0x12, 0x34]).unwrap();
        assert_eq!(answer.error_code(), Err(0x1234));
    }
}
