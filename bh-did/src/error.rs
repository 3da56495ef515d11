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

/// Error type for creating and maintaining identifiers.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum IdentifierError {
    /// A key could not be generated, loaded or migrated.
    #[strum(to_string = "Key management failed")]
    KeyManagement,

    /// The public key of a generated key could not be derived, or is not a
    /// `secp256k1` key.
    #[strum(to_string = "Unable to derive the public key of {0}")]
    PublicKeyDerivation(String),

    /// A document of the DID could not be serialized.
    #[strum(to_string = "Unable to serialize the {0}")]
    Serialization(&'static str),

    /// Random bytes could not be generated.
    #[strum(to_string = "Unable to generate a nonce")]
    NonceGeneration,
}

impl bherror::BhError for IdentifierError {}

/// Result type used across the crate.
pub type Result<T> = bherror::Result<T, IdentifierError>;
