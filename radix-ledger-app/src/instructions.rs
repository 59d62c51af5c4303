// SPDX-License-Identifier: Apache-2.0

//! APDU instruction constants for the Radix application.

/// APDU instruction codes for the Radix application.
pub mod ins {
    /// GET VERSION
    pub const GET_VERSION: u8 = 0x00;
    /// GET APP NAME
    pub const GET_APP_NAME: u8 = 0x01;
    /// DO SIGN HASH
    pub const DO_SIGN_HASH: u8 = 0x02;
    /// DO KEY EXCHANGE
    pub const DO_KEY_EXCHANGE: u8 = 0x04;
    /// DO SIGN TX
    pub const DO_SIGN_TX: u8 = 0x05;
    /// GET PUBLIC KEY
    pub const GET_PUBLIC_KEY: u8 = 0x08;
}

/// P1 values shared by GET_PUBLIC_KEY, DO_KEY_EXCHANGE and DO_SIGN_HASH: whether
/// the device should display the derivation path (and, for key exchange, the
/// counterparty public key) before returning.
pub mod p1_display {
    /// Return the value without on-device confirmation.
    pub const RETURN_ONLY: u8 = 0x00;
    /// Display on-device and require user confirmation.
    pub const DISPLAY_AND_CONFIRM: u8 = 0x01;
}

/// P1 values for the two DO_SIGN_TX streaming phases.
pub mod p1_sign_tx {
    /// Metadata frame, ASCII `'M'`.
    pub const METADATA: u8 = 0x4D;
    /// Instruction frame, ASCII `'I'`.
    pub const INSTRUCTION: u8 = 0x49;
}

/// P2 values for DO_SIGN_TX instruction frames.
pub mod p2_sign_tx {
    /// Not the last instruction in the stream.
    pub const NOT_LAST: u8 = 0x00;
    /// The last instruction in the stream.
    pub const LAST: u8 = 0x01;
}

/// Data length and layout constants.
pub mod length {
    /// Number of components in a Radix HD path.
    pub const HD_PATH_DEPTH: usize = 5;
    /// Size in bytes of a single HD path component.
    pub const HD_PATH_COMPONENT_SIZE: usize = 4;
    /// Maximum `data` length of a single APDU frame.
    pub const MAX_FRAME_DATA: usize = 255;
    /// Size of a SEC1-uncompressed secp256k1 public key.
    pub const UNCOMPRESSED_PUBKEY_SIZE: usize = 65;
}

/// Fixed APDU class byte used by every instruction in this app.
pub const CLA: u8 = 0xAA;
