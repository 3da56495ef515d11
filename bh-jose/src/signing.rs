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

use std::sync::Arc;

use bh_crypto::{CryptoOperations, Logger, PublicKey, Secret};
use bherror::{
    traits::{ErrorContext as _, PropagateError as _},
    Error,
};

use crate::{
    error::{Result, SignatureError},
    EcPublicJwk, Jwk,
};

/// Produces signatures over the protected message of a token.
pub trait TokenSigning: Send + Sync {
    /// Signs `protected_message` with `secret`.
    fn sign(&self, protected_message: &[u8], secret: &dyn Secret)
        -> Result<Vec<u8>, SignatureError>;
}

/// Checks signatures over the protected message of a token.
pub trait TokenVerifying: Send + Sync {
    /// Returns whether `signature` over `protected_message` verifies against
    /// `key`.
    fn verify(
        &self,
        protected_message: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<bool, SignatureError>;
}

/// [`TokenSigning`] implementation for the `ES256K` algorithm, backed by the
/// `secp256k1` entry of a [`CryptoOperations`] registry.
pub struct Secp256k1Signer {
    crypto_operations: Arc<CryptoOperations>,
}

impl Secp256k1Signer {
    /// Creates a signer dispatching to `crypto_operations`.
    pub fn new(crypto_operations: Arc<CryptoOperations>) -> Self {
        Self { crypto_operations }
    }

    /// Derives the public JWK of `secret`, labelled with `kid`.
    pub fn public_jwk(
        &self,
        secret: &dyn Secret,
        kid: impl Into<String>,
    ) -> Result<EcPublicJwk, SignatureError> {
        let public_key = self
            .crypto_operations
            .get_public_key(secret, bh_crypto::SECP256K1)
            .with_err(|| SignatureError::PublicKeyDerivation)?;

        EcPublicJwk::from_public_key(&public_key, kid)
            .with_err(|| SignatureError::PublicKeyDerivation)
    }
}

impl TokenSigning for Secp256k1Signer {
    fn sign(
        &self,
        protected_message: &[u8],
        secret: &dyn Secret,
    ) -> Result<Vec<u8>, SignatureError> {
        self.crypto_operations
            .sign(protected_message, secret, bh_crypto::SECP256K1)
            .with_err(|| SignatureError::Signing)
    }
}

/// [`TokenVerifying`] implementation dispatching on the curve of the JWK.
///
/// Supported curves are `secp256k1`, `P-256` and `Ed25519`.
pub struct TokenVerifier {
    crypto_operations: Arc<CryptoOperations>,
    logger: Arc<Logger>,
}

impl TokenVerifier {
    /// Creates a verifier dispatching to `crypto_operations`.
    pub fn new(crypto_operations: Arc<CryptoOperations>, logger: Arc<Logger>) -> Self {
        Self {
            crypto_operations,
            logger,
        }
    }

    /// Maps a JWK onto the [`PublicKey`] of its curve.
    pub fn public_key_from_jwk(jwk: &Jwk) -> Result<PublicKey, SignatureError> {
        let curve = jwk.crv.as_deref().unwrap_or_default();
        let missing = || SignatureError::MissingKeyMaterialInJwk;

        let x = jwk.x_bytes().with_err(missing)?;
        let y = jwk.y_bytes().with_err(missing)?;

        let key = match (curve.to_uppercase().as_str(), x, y) {
            (bh_crypto::SECP256K1, Some(x), Some(y)) => PublicKey::secp256k1(&x, &y),
            (bh_crypto::P256, Some(x), Some(y)) => PublicKey::p256(&x, &y),
            (bh_crypto::ED25519, Some(x), _) => PublicKey::ed25519(&x),
            (bh_crypto::SECP256K1 | bh_crypto::P256 | bh_crypto::ED25519, _, _) => {
                return Err(Error::root(missing()));
            }
            _ => {
                return Err(Error::root(SignatureError::UnsupportedAlgorithmInJwk(
                    curve.to_owned(),
                )));
            }
        };

        key.with_err(missing)
            .ctx(|| format!("invalid {curve} coordinates"))
    }
}

impl TokenVerifying for TokenVerifier {
    fn verify(
        &self,
        protected_message: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<bool, SignatureError> {
        let public_key = Self::public_key_from_jwk(key)?;

        let valid = self
            .crypto_operations
            .verify(signature, protected_message, &public_key)
            .with_err(|| SignatureError::Verification)?;

        if !valid {
            self.logger.debug(format!(
                "signature does not verify against key {:?}",
                key.kid
            ));
        }
        Ok(valid)
    }
}
