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

use bh_crypto::Logger;
use bh_jose::{Header, JwsToken, TokenVerifying};
use bherror::Error;

use crate::{
    error::{Result, ValidationError},
    IdentifierDocumentPublicKey,
};

/// The `kid` of a token header, split into the DID and the key fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHeaderKeyId {
    /// The DID the key belongs to.
    pub did: String,
    /// The fragment naming the key within the DID document.
    pub key_id: String,
}

impl TokenHeaderKeyId {
    /// Extracts the key id from `header`.
    ///
    /// The `kid` must split on `#` into exactly two non-empty components.
    pub fn from_header(header: &Header) -> Result<Self> {
        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| Error::root(ValidationError::NoKeyIdInHeader))?;

        let components: Vec<&str> = kid.split('#').filter(|part| !part.is_empty()).collect();
        match components.as_slice() {
            [did, key_id] => Ok(Self {
                did: (*did).to_owned(),
                key_id: (*key_id).to_owned(),
            }),
            _ => Err(Error::root(ValidationError::KeyIdMalformed(kid.to_owned()))),
        }
    }

    /// The id of the key in the DID document, `#fragment`.
    pub fn document_key_id(&self) -> String {
        format!("#{}", self.key_id)
    }
}

/// Verifies `token` against the keys of a DID document.
///
/// Every key whose id equals the `#fragment` of the token `kid` is tried, and
/// the first one that verifies wins. A key which fails to verify with an
/// error is logged and skipped.
pub fn verify_with_document_keys<T>(
    token: &JwsToken<T>,
    keys: &[IdentifierDocumentPublicKey],
    verifier: &dyn TokenVerifying,
    logger: &Logger,
) -> Result<()> {
    let key_id = TokenHeaderKeyId::from_header(token.headers())?;
    let document_key_id = key_id.document_key_id();

    for key in keys.iter().filter(|key| key.id == document_key_id) {
        match token.verify(verifier, &key.public_key_jwk) {
            Ok(true) => return Ok(()),
            Ok(false) => logger.debug(format!("key {} does not verify the token", key.id)),
            Err(error) => logger.warning(format!("unable to verify with key {}: {error}", key.id)),
        }
    }

    Err(Error::root(ValidationError::InvalidSignature))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use bh_crypto::{CryptoOperations, EphemeralSecret};
    use bh_jose::{Jwk, Secp256k1Signer, TokenVerifier};
    use serde::Serialize;

    use super::*;

    /// Signs with real `secp256k1` keys through the built-in registry.
    pub(crate) struct Keys {
        pub(crate) signer: Secp256k1Signer,
        pub(crate) verifier: TokenVerifier,
    }

    impl Keys {
        pub(crate) fn new() -> Self {
            let logger = Arc::new(Logger::silent());
            let ops = Arc::new(CryptoOperations::with_builtin_algorithms(logger.clone()));
            Self {
                signer: Secp256k1Signer::new(ops.clone()),
                verifier: TokenVerifier::new(ops, logger),
            }
        }

        pub(crate) fn document_key(
            &self,
            id: &str,
            secret: &EphemeralSecret,
        ) -> IdentifierDocumentPublicKey {
            IdentifierDocumentPublicKey {
                id: id.to_owned(),
                key_type: "EcdsaSecp256k1VerificationKey2019".to_owned(),
                controller: None,
                public_key_jwk: self.signer.public_jwk(secret, id).unwrap().to_jwk(),
                purposes: None,
            }
        }

        pub(crate) fn signed<T: Serialize>(
            &self,
            kid: &str,
            claims: T,
            secret: &EphemeralSecret,
        ) -> JwsToken<T> {
            let mut token = JwsToken::new(Header::jwt("ES256K", kid), claims).unwrap();
            token.sign(&self.signer, secret).unwrap();
            token
        }
    }

    fn header(kid: Option<&str>) -> Header {
        Header {
            kid: kid.map(str::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn key_id_is_split_into_did_and_fragment() {
        let key_id = TokenHeaderKeyId::from_header(&header(Some("did:example:abc#k2"))).unwrap();

        assert_eq!(key_id.did, "did:example:abc");
        assert_eq!(key_id.key_id, "k2");
        assert_eq!(key_id.document_key_id(), "#k2");
    }

    #[test]
    fn missing_and_malformed_key_ids() {
        let err = TokenHeaderKeyId::from_header(&header(None)).unwrap_err();
        assert_eq!(err.error, ValidationError::NoKeyIdInHeader);

        for kid in ["did:example:abc", "did:example:abc#k1#k2", "#k1", "did:example:abc#"] {
            let err = TokenHeaderKeyId::from_header(&header(Some(kid))).unwrap_err();
            assert_matches!(err.error, ValidationError::KeyIdMalformed(found) if found == kid);
        }
    }

    #[test]
    fn resolves_the_referenced_key() {
        let keys = Keys::new();
        let k1 = EphemeralSecret::generate(32).unwrap();
        let k2 = EphemeralSecret::generate(32).unwrap();
        let document = [keys.document_key("#k1", &k1), keys.document_key("#k2", &k2)];

        let token = keys.signed("did:example:abc#k2", "claims", &k2);
        verify_with_document_keys(&token, &document, &keys.verifier, &Logger::silent()).unwrap();

        let forged = keys.signed("did:example:abc#k2", "claims", &k1);
        let err = verify_with_document_keys(&forged, &document, &keys.verifier, &Logger::silent())
            .unwrap_err();
        assert_eq!(err.error, ValidationError::InvalidSignature);
    }

    #[test]
    fn absent_fragment_is_an_invalid_signature() {
        let keys = Keys::new();
        let k1 = EphemeralSecret::generate(32).unwrap();
        let document = [keys.document_key("#k1", &k1)];

        let token = keys.signed("did:example:abc#k2", "claims", &k1);
        let err = verify_with_document_keys(&token, &document, &keys.verifier, &Logger::silent())
            .unwrap_err();

        assert_eq!(err.error, ValidationError::InvalidSignature);
    }

    #[test]
    fn duplicate_ids_are_all_tried() {
        let keys = Keys::new();
        let old = EphemeralSecret::generate(32).unwrap();
        let current = EphemeralSecret::generate(32).unwrap();
        let broken = IdentifierDocumentPublicKey {
            public_key_jwk: Jwk {
                kty: "EC".to_owned(),
                crv: Some("P-384".to_owned()),
                ..Default::default()
            },
            ..keys.document_key("#k1", &old)
        };
        let document = [
            broken,
            keys.document_key("#k1", &old),
            keys.document_key("#k1", &current),
        ];

        let token = keys.signed("did:example:abc#k1", "claims", &current);

        verify_with_document_keys(&token, &document, &keys.verifier, &Logger::silent()).unwrap();
    }
}
