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

use std::{collections::HashMap, fmt, sync::Arc};

use bherror::{traits::ErrorContext, Error};

use crate::{
    error::{CryptoError, Result},
    logging::Logger,
    openssl_impl::{Ed25519, P256, Secp256k1},
    public_key::{self, PublicKey},
    secret::Secret,
};

/// Capability an algorithm may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Operation {
    /// Producing signatures with a secret.
    #[strum(to_string = "sign")]
    Sign,
    /// Checking signatures against a public key.
    #[strum(to_string = "verify")]
    Verify,
    /// Deriving the public key of a secret.
    #[strum(to_string = "getPublicKey")]
    GetPublicKey,
}

/// Signs messages with secret key material.
pub trait Signing: Send + Sync {
    /// Returns the signature of `message` made with `secret`.
    fn sign(&self, message: &[u8], secret: &dyn Secret) -> Result<Vec<u8>, CryptoError>;
}

/// Verifies signatures against public keys.
pub trait Verifying: Send + Sync {
    /// Returns whether `signature` is a valid signature of `message` by
    /// `public_key`.
    ///
    /// A well-formed signature which does not verify yields `Ok(false)`.
    fn is_valid_signature(
        &self,
        signature: &[u8],
        message: &[u8],
        public_key: &PublicKey,
    ) -> Result<bool, CryptoError>;
}

/// Derives public keys from secret key material.
pub trait PublicKeyDerivation: Send + Sync {
    /// Returns the public key belonging to `secret`.
    fn public_key(&self, secret: &dyn Secret) -> Result<PublicKey, CryptoError>;
}

/// A named curve together with the capabilities implemented for it.
#[derive(Clone)]
pub struct SigningAlgorithm {
    curve: String,
    signing: Option<Arc<dyn Signing>>,
    verifying: Option<Arc<dyn Verifying>>,
    public_key_derivation: Option<Arc<dyn PublicKeyDerivation>>,
}

impl SigningAlgorithm {
    /// Creates an algorithm for `curve` without any capability.
    pub fn new(curve: impl Into<String>) -> Self {
        Self {
            curve: curve.into(),
            signing: None,
            verifying: None,
            public_key_derivation: None,
        }
    }

    /// Adds the signing capability.
    pub fn with_signing(mut self, signing: Arc<dyn Signing>) -> Self {
        self.signing = Some(signing);
        self
    }

    /// Adds the verification capability.
    pub fn with_verifying(mut self, verifying: Arc<dyn Verifying>) -> Self {
        self.verifying = Some(verifying);
        self
    }

    /// Adds the public key derivation capability.
    pub fn with_public_key_derivation(mut self, derivation: Arc<dyn PublicKeyDerivation>) -> Self {
        self.public_key_derivation = Some(derivation);
        self
    }

    /// Name of the curve.
    pub fn curve(&self) -> &str {
        &self.curve
    }

    /// Operations this algorithm supports.
    pub fn supported_operations(&self) -> Vec<Operation> {
        let mut operations = Vec::new();
        if self.signing.is_some() {
            operations.push(Operation::Sign);
        }
        if self.verifying.is_some() {
            operations.push(Operation::Verify);
        }
        if self.public_key_derivation.is_some() {
            operations.push(Operation::GetPublicKey);
        }
        operations
    }
}

impl fmt::Debug for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningAlgorithm")
            .field("curve", &self.curve)
            .field("supported_operations", &self.supported_operations())
            .finish()
    }
}

/// The built-in algorithms: `secp256k1` with every capability, `P-256` and
/// `Ed25519` for verification only.
pub fn builtin_algorithms() -> Vec<SigningAlgorithm> {
    let secp256k1 = Arc::new(Secp256k1);
    vec![
        SigningAlgorithm::new(public_key::SECP256K1)
            .with_signing(secp256k1.clone())
            .with_verifying(secp256k1.clone())
            .with_public_key_derivation(secp256k1),
        SigningAlgorithm::new(public_key::P256).with_verifying(Arc::new(P256)),
        SigningAlgorithm::new(public_key::ED25519).with_verifying(Arc::new(Ed25519)),
    ]
}

/// Registry of signing algorithms keyed by curve name.
///
/// Names are matched case-insensitively. The registry is immutable once
/// constructed.
pub struct CryptoOperations {
    algorithms: HashMap<String, SigningAlgorithm>,
    logger: Arc<Logger>,
}

impl CryptoOperations {
    /// Builds a registry of `additional` algorithms merged with the built-in
    /// ones.
    ///
    /// A built-in algorithm takes precedence over an additional one registered
    /// under the same name.
    pub fn new(additional: Vec<SigningAlgorithm>, logger: Arc<Logger>) -> Self {
        let mut algorithms: HashMap<String, SigningAlgorithm> = additional
            .into_iter()
            .map(|algorithm| (algorithm.curve.to_uppercase(), algorithm))
            .collect();

        for builtin in builtin_algorithms() {
            let name = builtin.curve.to_uppercase();
            if algorithms.insert(name.clone(), builtin).is_some() {
                logger.warning(format!(
                    "additional algorithm {name} ignored in favour of the built-in one"
                ));
            }
        }

        Self { algorithms, logger }
    }

    /// Builds a registry of the built-in algorithms only.
    pub fn with_builtin_algorithms(logger: Arc<Logger>) -> Self {
        Self::new(Vec::new(), logger)
    }

    /// Looks up the algorithm registered under `name`.
    pub fn algorithm(&self, name: &str) -> Result<&SigningAlgorithm, CryptoError> {
        self.algorithms
            .get(&name.to_uppercase())
            .ok_or_else(|| Error::root(CryptoError::AlgorithmNotSupported(name.to_owned())))
    }

    /// Signs `message` with `secret` using the algorithm named `algorithm`.
    pub fn sign(
        &self,
        message: &[u8],
        secret: &dyn Secret,
        algorithm: &str,
    ) -> Result<Vec<u8>, CryptoError> {
        let signing = self
            .algorithm(algorithm)?
            .signing
            .as_ref()
            .ok_or_else(|| Error::root(CryptoError::DoesNotSupportSigning(algorithm.to_owned())))?;

        signing
            .sign(message, secret)
            .ctx(|| format!("signing with {algorithm}"))
    }

    /// Checks `signature` over `message` against `public_key`.
    ///
    /// The algorithm is chosen by [`PublicKey::algorithm`].
    pub fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        public_key: &PublicKey,
    ) -> Result<bool, CryptoError> {
        let name = public_key.algorithm();
        let verifying = self
            .algorithm(name)?
            .verifying
            .as_ref()
            .ok_or_else(|| Error::root(CryptoError::DoesNotSupportVerification(name.to_owned())))?;

        let valid = verifying
            .is_valid_signature(signature, message, public_key)
            .ctx(|| format!("verifying with {name}"))?;

        if !valid {
            self.logger.debug(format!("{name} signature did not verify"));
        }
        Ok(valid)
    }

    /// Derives the public key of `secret` using the algorithm named
    /// `algorithm`.
    pub fn get_public_key(
        &self,
        secret: &dyn Secret,
        algorithm: &str,
    ) -> Result<PublicKey, CryptoError> {
        let derivation = self
            .algorithm(algorithm)?
            .public_key_derivation
            .as_ref()
            .ok_or_else(|| {
                Error::root(CryptoError::DoesNotSupportGetPublicKey(algorithm.to_owned()))
            })?;

        derivation
            .public_key(secret)
            .ctx(|| format!("deriving {algorithm} public key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::EphemeralSecret;

    /// Signs by prefixing the message with a marker.
    struct StubSigning;

    impl Signing for StubSigning {
        fn sign(&self, message: &[u8], _secret: &dyn Secret) -> Result<Vec<u8>, CryptoError> {
            Ok([b"stub:".as_slice(), message].concat())
        }
    }

    impl Verifying for StubSigning {
        fn is_valid_signature(
            &self,
            signature: &[u8],
            message: &[u8],
            _public_key: &PublicKey,
        ) -> Result<bool, CryptoError> {
            Ok(signature == [b"stub:".as_slice(), message].concat())
        }
    }

    fn registry(additional: Vec<SigningAlgorithm>) -> CryptoOperations {
        CryptoOperations::new(additional, Arc::new(Logger::silent()))
    }

    #[test]
    fn unknown_algorithm_is_not_supported() {
        let ops = registry(vec![]);
        let secret = EphemeralSecret::new(32);

        let err = ops.sign(b"message", &secret, "RSA").unwrap_err();
        assert_eq!(err.error, CryptoError::AlgorithmNotSupported("RSA".to_owned()));
    }

    #[test]
    fn verify_only_curves_cannot_sign_or_derive() {
        let ops = registry(vec![]);
        let secret = EphemeralSecret::new(32);

        for curve in [public_key::P256, public_key::ED25519] {
            let err = ops.sign(b"message", &secret, curve).unwrap_err();
            assert_eq!(err.error, CryptoError::DoesNotSupportSigning(curve.to_owned()));

            let err = ops.get_public_key(&secret, curve).unwrap_err();
            assert_eq!(
                err.error,
                CryptoError::DoesNotSupportGetPublicKey(curve.to_owned())
            );
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let ops = registry(vec![]);

        assert_eq!(ops.algorithm("secp256k1").unwrap().curve(), "SECP256K1");
        assert_eq!(ops.algorithm("ed25519").unwrap().curve(), "ED25519");
    }

    #[test]
    fn additional_algorithm_is_dispatched() {
        let stub = Arc::new(StubSigning);
        let ops = registry(vec![SigningAlgorithm::new("stub")
            .with_signing(stub.clone())
            .with_verifying(stub)]);
        let secret = EphemeralSecret::new(1);

        let signature = ops.sign(b"hello", &secret, "STUB").unwrap();
        assert_eq!(signature, b"stub:hello");

        let key = PublicKey::from_uncompressed("Stub", vec![]);
        assert!(ops.verify(&signature, b"hello", &key).unwrap());
        assert!(!ops.verify(&signature, b"hellO", &key).unwrap());

        assert_eq!(
            ops.algorithm("stub").unwrap().supported_operations(),
            vec![Operation::Sign, Operation::Verify]
        );
    }

    #[test]
    fn builtin_takes_precedence_over_additional() {
        let ops = registry(vec![
            SigningAlgorithm::new("secp256k1").with_signing(Arc::new(StubSigning))
        ]);

        assert_eq!(
            ops.algorithm(public_key::SECP256K1)
                .unwrap()
                .supported_operations(),
            vec![Operation::Sign, Operation::Verify, Operation::GetPublicKey]
        );
    }
}
