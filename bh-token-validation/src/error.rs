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

use std::fmt;

use crate::SecondsSinceEpoch;

/// Error type for token validation.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum ValidationError {
    /// The token header has no `kid`.
    #[strum(to_string = "No key id in the token header")]
    NoKeyIdInHeader,

    /// The `kid` is not of the form `did#fragment`.
    #[strum(to_string = "Malformed key id \"{0}\" in the token header")]
    KeyIdMalformed(String),

    /// No key of the DID document with the referenced id verifies the token.
    #[strum(to_string = "Invalid signature")]
    InvalidSignature,

    /// The DID document publishes no verification methods.
    #[strum(to_string = "No public keys in the identifier document")]
    NoPublicKeysInDocument,

    /// The `exp` claim is required but absent.
    #[strum(to_string = "No expiration present")]
    NoExpirationPresent,

    /// The token expired, beyond the allowed clock skew.
    ///
    /// Holds the current time and the `exp` claim.
    #[strum(to_string = "Token expired: current time {0}, expiration {1}")]
    TokenExpired(SecondsSinceEpoch, SecondsSinceEpoch),

    /// The token was issued in the future, beyond the allowed clock skew.
    ///
    /// Holds the current time and the `iat` claim.
    #[strum(to_string = "Token issued in the future: current time {0}, issued at {1}")]
    TokenIssuedInFuture(SecondsSinceEpoch, SecondsSinceEpoch),

    /// The `scope` claim is not the supported one.
    #[strum(to_string = "Invalid scope value")]
    InvalidScopeValue,

    /// The `response_mode` claim is not the supported one.
    #[strum(to_string = "Invalid response mode value")]
    InvalidResponseModeValue,

    /// The `response_type` claim is not the supported one.
    #[strum(to_string = "Invalid response type value")]
    InvalidResponseTypeValue,

    /// The `registration` claim is absent.
    #[strum(to_string = "No registration present")]
    NoRegistrationPresent,

    /// The relying party does not accept DIDs as subject identifiers.
    #[strum(to_string = "Subject identifier type not supported")]
    SubjectIdentifierTypeNotSupported,

    /// The relying party does not accept presentations signed with the
    /// supported algorithm.
    #[strum(to_string = "Response signing algorithm not supported for VPs")]
    SigningAlgorithmNotSupportedForVps,

    /// The relying party does not accept credentials signed with the
    /// supported algorithm.
    #[strum(to_string = "Response signing algorithm not supported for VCs")]
    SigningAlgorithmNotSupportedForVcs,

    /// One or more cross-checks of a domain linkage credential failed.
    #[strum(to_string = "Domain linkage credential does not match: {0}")]
    DomainLinkageMismatch(Mismatches),

    /// The well-known DID configuration is not valid JSON of the expected
    /// shape.
    #[strum(to_string = "Unable to parse the well-known DID configuration")]
    UnableToParseWellKnownConfig,

    /// A `linked_dids` entry is not a valid compact JWS.
    #[strum(to_string = "Unable to parse linked DID token")]
    UnableToParseLinkedDidToken,
}

impl bherror::BhError for ValidationError {}

/// A single failed cross-check of a domain linkage credential.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum Mismatch {
    /// The token issuer is not the credential subject.
    ///
    /// Holds the credential subject and the token issuer.
    #[strum(to_string = "credential subject {0} and token issuer {1}")]
    TokenIssuer(String, String),

    /// The token subject is not the credential subject.
    ///
    /// Holds the credential subject and the token subject.
    #[strum(to_string = "credential subject {0} and token subject {1}")]
    TokenSubject(String, String),

    /// The DID document is not the one of the credential subject.
    ///
    /// Holds the credential subject and the DID document id.
    #[strum(to_string = "credential subject {0} and identifier document {1}")]
    DocumentId(String, String),

    /// The credential links another domain than the one it was fetched from.
    ///
    /// Holds the source domain and the linked domain.
    #[strum(to_string = "source domain {0} and well-known domain {1}")]
    DomainUrl(String, String),

    /// The token was signed by a key of another DID than the DID document.
    ///
    /// Holds the DID of the header `kid` and the DID document id.
    #[strum(to_string = "key id DID {0} and identifier document {1}")]
    KeyIdDid(String, String),
}

/// Every failed cross-check of a domain linkage credential.
#[derive(Debug, PartialEq, Clone)]
pub struct Mismatches(pub Vec<Mismatch>);

impl fmt::Display for Mismatches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, mismatch) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{mismatch}")?;
        }
        Ok(())
    }
}

/// Result type used across the crate.
pub type Result<T> = bherror::Result<T, ValidationError>;
