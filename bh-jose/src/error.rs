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

/// Error type for the encoding and decoding of tokens and keys.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum FormatError {
    /// The compact token does not have the expected number of parts.
    ///
    /// Holds the number of `.`-separated parts required and found.
    #[strum(to_string = "Malformed token: expected {0} parts, found {1}")]
    MalformedToken(usize, usize),

    /// A component of the token is not valid `base64url` or JSON.
    #[strum(to_string = "Unable to parse the {0} of the token")]
    UnableToParseToken(&'static str),

    /// A value could not be serialized to JSON.
    #[strum(to_string = "Unable to serialize {0}")]
    Serialization(&'static str),

    /// The JWK is malformed.
    #[strum(to_string = "Invalid JWK: {0}")]
    InvalidJwk(String),
}

impl bherror::BhError for FormatError {}

/// Error type for signing and verifying tokens.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum SignatureError {
    /// The signature could not be produced.
    #[strum(to_string = "Unable to sign the token")]
    Signing,

    /// The signature could not be checked.
    #[strum(to_string = "Unable to verify the token signature")]
    Verification,

    /// The public key could not be derived from the secret.
    #[strum(to_string = "Unable to derive the public key")]
    PublicKeyDerivation,

    /// The JWK lacks coordinates required by its curve.
    #[strum(to_string = "Missing key material in JWK")]
    MissingKeyMaterialInJwk,

    /// The JWK names a curve no verifier exists for.
    #[strum(to_string = "Unsupported algorithm \"{0}\" in JWK")]
    UnsupportedAlgorithmInJwk(String),
}

impl bherror::BhError for SignatureError {}

/// Error type for password-based JWE.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum JweError {
    /// The `alg` header is missing or not a supported PBES2 algorithm.
    #[strum(to_string = "Invalid key management algorithm")]
    InvalidAlgorithm,

    /// The `enc` header is missing or not a supported content encryption.
    #[strum(to_string = "Invalid content encryption method")]
    InvalidEncryptionMethod,

    /// The `p2s` or `p2c` header is missing or invalid.
    #[strum(to_string = "Invalid PBES2 salt input or iteration count")]
    InvalidSaltInput,

    /// The authentication tag or the wrapped key failed the integrity check.
    #[strum(to_string = "Unable to authenticate the token")]
    Unauthenticatable,

    /// The `cty` header is missing.
    #[strum(to_string = "Missing content type")]
    InvalidContentType,

    /// The token could not be encoded or decoded.
    #[strum(to_string = "Invalid token format")]
    Format,

    /// The cryptographic backend unexpectedly failed.
    #[strum(to_string = "Crypto backend failed")]
    CryptoBackend,
}

impl bherror::BhError for JweError {}

/// Result type used across the crate.
pub type Result<T, E> = bherror::Result<T, E>;
