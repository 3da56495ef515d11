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

//! This crate provides the compact [JSON Web Signature (JWS)][1] and
//! password-based [JSON Web Encryption (JWE)][2] codecs of the wallet,
//! together with the [JSON Web Key (JWK)][3] model.
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7515
//! [2]: https://datatracker.ietf.org/doc/html/rfc7516
//! [3]: https://datatracker.ietf.org/doc/html/rfc7517
//!
//! # Details
//!
//! A [`JwsToken`] carries a [`Header`] and typed claims. Signing goes through
//! the [`TokenSigning`] trait and verification through [`TokenVerifying`]. The
//! [`Secp256k1Signer`] and [`TokenVerifier`] implementations dispatch to a
//! [`bh_crypto::CryptoOperations`] registry, the latter choosing the curve
//! from the JWK it verifies against.
//!
//! A parsed token keeps the exact string it was received as. Verification
//! runs over the received bytes, never over a re-serialization.
//!
//! A [`JweToken`] is encrypted with a `PBES2` [`KeyAlgorithm`] and an
//! `AES-CBC-HMAC-SHA2` [`EncryptionMethod`]. [`PasswordProtection`] wraps it
//! into a `protect` / `unprotect` pair over compact strings.
//!
//! # Examples
//!
//! ## Sign and verify a JWS
//!
//! ```
//! use std::sync::Arc;
//!
//! use bh_crypto::{CryptoOperations, EphemeralSecret, Logger};
//! use bh_jose::{Header, JwsToken, Secp256k1Signer, TokenVerifier};
//!
//! let logger = Arc::new(Logger::silent());
//! let ops = Arc::new(CryptoOperations::with_builtin_algorithms(logger.clone()));
//! let signer = Secp256k1Signer::new(ops.clone());
//! let verifier = TokenVerifier::new(ops, logger);
//!
//! let secret = EphemeralSecret::generate(32).unwrap();
//! let jwk = signer.public_jwk(&secret, "key-1").unwrap();
//!
//! let claims = serde_json::json!({ "sub": "did:example:holder" });
//! let mut token = JwsToken::new(Header::jwt("ES256K", "key-1"), claims).unwrap();
//! token.sign(&signer, &secret).unwrap();
//!
//! let parsed = JwsToken::<serde_json::Value>::parse(&token.serialize()).unwrap();
//! assert!(parsed.verify(&verifier, &jwk.to_jwk()).unwrap());
//! ```
//!
//! ## Protect content with a password
//!
//! ```
//! use bh_jose::PasswordProtection;
//!
//! let protection = PasswordProtection::new("correct horse battery staple");
//! let compact = protection.protect("text/plain", b"backup").unwrap();
//!
//! let recovered = protection.unprotect(&compact).unwrap();
//! assert_eq!(recovered.content_type, "text/plain");
//! assert_eq!(recovered.content, b"backup");
//! ```

mod error;
mod header;
mod jwe;
mod jwk;
mod jws;
mod password_protection;
mod signing;
mod utils;

pub use error::*;
pub use header::*;
pub use jwe::*;
pub use jwk::*;
pub use jws::*;
pub use password_protection::*;
pub use signing::*;
pub use utils::{base64_url_decode, base64_url_encode, encode_json_part};
