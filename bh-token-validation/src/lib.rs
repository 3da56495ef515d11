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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate validates the signed tokens a wallet receives against the keys
//! of a resolved DID document.
//!
//! # Details
//!
//! Every token names its signing key in the `kid` header as
//! `did#fragment`. [`verify_with_document_keys`] tries each key of the
//! [`IdentifierDocument`] whose id is `#fragment`, and succeeds on the first
//! one that verifies. On top of that:
//!
//! - [`PresentationRequestValidator`] requires a fresh `exp`, the supported
//!   OpenID protocol values and a relying party registration that accepts
//!   DIDs and `ES256K`;
//! - [`IssuanceRequestValidator`] checks only the signature;
//! - [`DomainLinkageCredentialValidator`] cross-checks a credential of a
//!   [`WellKnownConfigDocument`] against the DID document and the origin it
//!   was fetched from, reporting every mismatch at once.
//!
//! Times are passed in as [`SecondsSinceEpoch`], and checked with a
//! tolerance of [`CLOCK_SKEW`].
//!
//! # Examples
//!
//! ## Validate an issuance request
//!
//! ```
//! use std::sync::Arc;
//!
//! use bh_crypto::{CryptoOperations, EphemeralSecret, Logger};
//! use bh_jose::{Header, JwsToken, Secp256k1Signer, TokenVerifier};
//! use bh_token_validation::{IdentifierDocumentPublicKey, IssuanceRequestValidator};
//!
//! let logger = Arc::new(Logger::silent());
//! let ops = Arc::new(CryptoOperations::with_builtin_algorithms(logger.clone()));
//! let signer = Secp256k1Signer::new(ops.clone());
//!
//! // The issuer signs the request with the key published as `#sign_1`.
//! let secret = EphemeralSecret::generate(32).unwrap();
//! let mut request = JwsToken::new(
//!     Header::jwt("ES256K", "did:ion:issuer#sign_1"),
//!     serde_json::json!({"contract": "https://issuer.example.com/contract"}),
//! )
//! .unwrap();
//! request.sign(&signer, &secret).unwrap();
//!
//! let keys = [IdentifierDocumentPublicKey {
//!     id: "#sign_1".to_owned(),
//!     key_type: "EcdsaSecp256k1VerificationKey2019".to_owned(),
//!     controller: None,
//!     public_key_jwk: signer.public_jwk(&secret, "sign_1").unwrap().to_jwk(),
//!     purposes: None,
//! }];
//!
//! let verifier = Arc::new(TokenVerifier::new(ops, logger.clone()));
//! let validator = IssuanceRequestValidator::new(verifier, logger);
//! validator.validate(&request, &keys).unwrap();
//! ```

mod document;
mod domain_linkage;
mod error;
mod issuance;
mod key_resolution;
mod presentation;
mod time;
mod well_known;

pub use document::*;
pub use domain_linkage::*;
pub use error::*;
pub use issuance::*;
pub use key_resolution::*;
pub use presentation::*;
pub use time::*;
pub use well_known::*;
