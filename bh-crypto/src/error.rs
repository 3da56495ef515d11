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

/// Status reported by the in-memory store when its lock has been poisoned.
pub const LOCK_POISONED_STATUS: i32 = -1;

/// Error returned by a [`SecretStore`](crate::SecretStore).
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum SecretStoreError {
    /// The requested item does not exist in the store.
    ///
    /// This is an expected condition, callers may recover from it.
    #[strum(to_string = "Item not found in the secret store")]
    ItemNotFound,

    /// Reading from the store failed with the given native status.
    #[strum(to_string = "Unable to read from the secret store (status {0}): {1}")]
    ReadFromStore(i32, String),

    /// Saving to the store failed with the given native status.
    #[strum(to_string = "Unable to save to the secret store (status {0}): {1}")]
    SaveToStore(i32, String),

    /// Deleting from the store failed with the given native status.
    #[strum(to_string = "Unable to delete from the secret store (status {0}): {1}")]
    DeleteFromStore(i32, String),

    /// The item type code is not exactly four characters long.
    #[strum(to_string = "Invalid item type code \"{0}\"")]
    InvalidType(String),
}

impl bherror::BhError for SecretStoreError {}

/// Error returned by the crypto operations.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum CryptoError {
    /// No algorithm is registered under the given name.
    #[strum(to_string = "Signing algorithm {0} is not supported")]
    AlgorithmNotSupported(String),

    /// The algorithm is registered but cannot sign.
    #[strum(to_string = "Algorithm {0} does not support signing")]
    DoesNotSupportSigning(String),

    /// The algorithm is registered but cannot verify signatures.
    #[strum(to_string = "Algorithm {0} does not support verification")]
    DoesNotSupportVerification(String),

    /// The algorithm is registered but cannot derive a public key from a
    /// secret.
    #[strum(to_string = "Algorithm {0} does not support public key derivation")]
    DoesNotSupportGetPublicKey(String),

    /// The bytes of the secret could not be accessed.
    #[strum(to_string = "Unable to access the secret")]
    SecretAccess,

    /// The secret is not a valid private key for the curve.
    #[strum(to_string = "Secret is not a valid private key")]
    InvalidSecret,

    /// The public key is malformed or does not belong to the curve.
    #[strum(to_string = "Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The signature does not have the shape required by the algorithm.
    #[strum(to_string = "Malformed signature")]
    MalformedSignature,

    /// Random key material could not be generated.
    #[strum(to_string = "Key generation failed")]
    KeyGenerationFailed,

    /// The cryptographic backend unexpectedly failed.
    #[strum(to_string = "Crypto backend failed")]
    CryptoBackend,
}

impl bherror::BhError for CryptoError {}

/// Result type used across the crate.
pub type Result<T, E> = bherror::Result<T, E>;
