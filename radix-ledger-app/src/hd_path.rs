// SPDX-License-Identifier: Apache-2.0

//! Fixed-depth BIP32 path encoding for the Radix application.

use thiserror::Error;

use crate::instructions::length::{HD_PATH_COMPONENT_SIZE, HD_PATH_DEPTH};

const HARDENED_BIT: u32 = 0x8000_0000;
const RADIX_COIN_TYPE: u32 = 536;

/// Rejected because the path's coin type is not Radix's hardened `536`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("HD path must derive the hardened Radix coin type (536')")]
pub struct InvalidHdPath;

/// Rejected because the encoded bytes don't parse as a Radix HD path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HdPathDecodeError {
    /// Fewer bytes than the count prefix plus five components requires.
    #[error("HD path data too short: expected {expected} bytes, got {got}")]
    TooShort { expected: usize, got: usize },
    /// The count prefix wasn't `5`, the only depth this app accepts.
    #[error("HD path has {0} components, expected {}", HD_PATH_DEPTH)]
    WrongDepth(u8),
    /// The decoded components don't derive Radix's hardened coin type.
    #[error(transparent)]
    InvalidHdPath(#[from] InvalidHdPath),
}

/// A Radix HD path: purpose / coin_type / account / change / index, each a
/// 32-bit component that may carry the hardening bit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HdPath {
    components: [u32; HD_PATH_DEPTH],
}

impl HdPath {
    /// Build a path from its five raw components. Rejects any path whose
    /// `coin_type` component isn't the hardened Radix coin type.
    pub fn new(components: [u32; HD_PATH_DEPTH]) -> Result<Self, InvalidHdPath> {
        let coin_type = components[1];
        if coin_type != (RADIX_COIN_TYPE | HARDENED_BIT) {
            return Err(InvalidHdPath);
        }
        Ok(Self { components })
    }

    /// The five path components, in order.
    pub fn components(&self) -> [u32; HD_PATH_DEPTH] {
        self.components
    }

    /// Encode as `count ‖ count × u32_be(component)` — 21 bytes for a
    /// Radix path.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + HD_PATH_DEPTH * HD_PATH_COMPONENT_SIZE);
        out.push(HD_PATH_DEPTH as u8);
        for component in &self.components {
            out.extend_from_slice(&component.to_be_bytes());
        }
        out
    }

    /// Parse the `count ‖ count × u32_be(component)` layout [`HdPath::encode`]
    /// produces, rejecting anything but a 5-component Radix path.
    pub fn decode(data: &[u8]) -> Result<Self, HdPathDecodeError> {
        let expected = 1 + HD_PATH_DEPTH * HD_PATH_COMPONENT_SIZE;
        if data.len() < expected {
            return Err(HdPathDecodeError::TooShort {
                expected,
                got: data.len(),
            });
        }

        let depth = data[0];
        if depth as usize != HD_PATH_DEPTH {
            return Err(HdPathDecodeError::WrongDepth(depth));
        }

        let mut components = [0u32; HD_PATH_DEPTH];
        for (i, component) in components.iter_mut().enumerate() {
            let start = 1 + i * HD_PATH_COMPONENT_SIZE;
            let bytes: [u8; HD_PATH_COMPONENT_SIZE] = data[start..start + HD_PATH_COMPONENT_SIZE]
                .try_into()
                .expect("slice has exactly HD_PATH_COMPONENT_SIZE bytes");
            *component = u32::from_be_bytes(bytes);
        }

        Ok(Self::new(components)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_default_radix_path() {
        let path = HdPath::new([
            0x8000_0054,
            0x8000_0218,
            0x8000_0000,
            0x0000_0000,
            0x0000_0000,
        ])
        .unwrap();

        assert_eq!(
            path.encode(),
            vec![
                0x05, //
                0x80, 0x00, 0x00, 0x54, //
                0x80, 0x00, 0x02, 0x18, //
                0x80, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
            ]
        );
        assert_eq!(path.encode().len(), 21);
    }

    #[test]
    fn rejects_non_radix_coin_type() {
        let result = HdPath::new([0x8000_0054, 0x0000_0001, 0, 0, 0]);
        assert_eq!(result, Err(InvalidHdPath));
    }

    #[test]
    fn rejects_unhardened_coin_type() {
        let result = HdPath::new([0x8000_0054, 536, 0, 0, 0]);
        assert_eq!(result, Err(InvalidHdPath));
    }

    #[test]
    fn decode_is_inverse_of_encode() {
        let path = HdPath::new([
            0x8000_0054,
            0x8000_0218,
            0x8000_0001,
            0x0000_0000,
            0x0000_0003,
        ])
        .unwrap();

        let decoded = HdPath::decode(&path.encode()).unwrap();
        assert_eq!(decoded, path);
    }

    #[test]
    fn decode_rejects_short_data() {
        let result = HdPath::decode(&[0x05, 0x80, 0x00, 0x00, 0x54]);
        assert_eq!(
            result,
            Err(HdPathDecodeError::TooShort {
                expected: 21,
                got: 5,
            })
        );
    }

    #[test]
    fn decode_rejects_wrong_depth() {
        let mut data = vec![0x04];
        data.extend(std::iter::repeat(0u8).take(16));
        assert_eq!(HdPath::decode(&data), Err(HdPathDecodeError::WrongDepth(4)));
    }
}
