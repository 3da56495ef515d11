// Copyright (C) 2020-2025  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use bherror::Error;

use crate::error::{CryptoError, Result};

/// Registry name of the `secp256k1` curve.
pub const SECP256K1: &str = "SECP256K1";
/// Registry name of the `P-256` curve.
pub const P256: &str = "P-256";
/// Registry name of the `Ed25519` curve.
pub const ED25519: &str = "ED25519";

/// Length of an affine elliptic-curve coordinate, in bytes.
pub const COORDINATE_LEN: usize = 32;

const UNCOMPRESSED_TAG: u8 = 0x04;

/// A public key tagged with the name of its curve.
///
/// `secp256k1` keys are held in the uncompressed SEC1 form
/// `0x04 ‖ X(32) ‖ Y(32)`, `P-256` keys as the untagged `X(32) ‖ Y(32)` and
/// Edwards keys as the raw 32-byte encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    algorithm: String,
    uncompressed_value: Vec<u8>,
}

impl PublicKey {
    /// Builds a `secp256k1` key from its affine coordinates.
    pub fn secp256k1(x: &[u8], y: &[u8]) -> Result<Self, CryptoError> {
        Self::from_coordinates(SECP256K1, x, y)
    }

    /// Builds a `P-256` key from its affine coordinates.
    pub fn p256(x: &[u8], y: &[u8]) -> Result<Self, CryptoError> {
        check_coordinate_len(x)?;
        check_coordinate_len(y)?;

        Ok(Self {
            algorithm: P256.to_owned(),
            uncompressed_value: [x, y].concat(),
        })
    }

    /// Builds an `Ed25519` key from its raw encoding.
    pub fn ed25519(x: &[u8]) -> Result<Self, CryptoError> {
        check_coordinate_len(x)?;
        Ok(Self {
            algorithm: ED25519.to_owned(),
            uncompressed_value: x.to_vec(),
        })
    }

    /// Wraps an already encoded key without inspecting it.
    pub fn from_uncompressed(algorithm: impl Into<String>, uncompressed_value: Vec<u8>) -> Self {
        Self {
            algorithm: algorithm.into(),
            uncompressed_value,
        }
    }

    /// Name of the curve the key belongs to.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Encoded key bytes.
    pub fn uncompressed_value(&self) -> &[u8] {
        &self.uncompressed_value
    }

    /// Splits a Weierstrass key into its `(x, y)` coordinates.
    ///
    /// `P-256` keys have to be exactly 64 untagged bytes, other keys have to
    /// be in the 65-byte tagged form.
    pub fn coordinates(&self) -> Result<(&[u8], &[u8]), CryptoError> {
        let coordinates = if self.algorithm.eq_ignore_ascii_case(P256) {
            Some(self.uncompressed_value.as_slice())
        } else {
            match self.uncompressed_value.split_first() {
                Some((&UNCOMPRESSED_TAG, rest)) => Some(rest),
                _ => None,
            }
        };

        match coordinates {
            Some(xy) if xy.len() == 2 * COORDINATE_LEN => Ok(xy.split_at(COORDINATE_LEN)),
            _ => Err(Error::root(CryptoError::InvalidPublicKey(format!(
                "{} key is not in uncompressed form",
                self.algorithm
            )))),
        }
    }

    fn from_coordinates(algorithm: &str, x: &[u8], y: &[u8]) -> Result<Self, CryptoError> {
        check_coordinate_len(x)?;
        check_coordinate_len(y)?;

        let mut uncompressed_value = Vec::with_capacity(1 + 2 * COORDINATE_LEN);
        uncompressed_value.push(UNCOMPRESSED_TAG);
        uncompressed_value.extend_from_slice(x);
        uncompressed_value.extend_from_slice(y);

        Ok(Self {
            algorithm: algorithm.to_owned(),
            uncompressed_value,
        })
    }
}

fn check_coordinate_len(coordinate: &[u8]) -> Result<(), CryptoError> {
    if coordinate.len() != COORDINATE_LEN {
        return Err(Error::root(CryptoError::InvalidPublicKey(format!(
            "coordinate has {} bytes, expected {}",
            coordinate.len(),
            COORDINATE_LEN
        ))));
    }

    Ok(())
}
