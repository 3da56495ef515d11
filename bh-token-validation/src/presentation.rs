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

use bh_crypto::Logger;
use bh_jose::{JwsToken, TokenVerifying};
use bherror::Error;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, ValidationError},
    time::{deserialize_optional_numeric_date, validate_exp_required},
    verify_with_document_keys, IdentifierDocumentPublicKey, SecondsSinceEpoch, CLOCK_SKEW,
};

/// The only supported `scope`.
pub const SCOPE: &str = "openid";
/// The only supported `response_mode`.
pub const RESPONSE_MODE: &str = "post";
/// The only supported `response_type`.
pub const RESPONSE_TYPE: &str = "id_token";
/// Subject identifier type the relying party has to accept.
pub const SUBJECT_IDENTIFIER_TYPE_DID: &str = "did";
/// Signing algorithm the relying party has to accept for responses.
pub const SUPPORTED_SIGNING_ALGORITHM: &str = "ES256K";

/// Claims of an OpenID presentation request.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PresentationRequestClaims {
    /// Token id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Id of the relying party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Where to send the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Requested response type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    /// Requested response mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mode: Option<String>,
    /// Requested credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<serde_json::Value>,
    /// Opaque state echoed in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Nonce echoed in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Requested scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Requested prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Metadata of the relying party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationClaims>,
    /// Hint about the expected subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_hint: Option<String>,
    /// Issuance time.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<SecondsSinceEpoch>,
    /// Expiration time.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<SecondsSinceEpoch>,
    /// Pin the holder has to enter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<serde_json::Value>,
}

/// Signed presentation request.
pub type PresentationRequestToken = JwsToken<PresentationRequestClaims>;

/// Metadata of the relying party.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RegistrationClaims {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// Why the credentials are requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_purpose: Option<String>,
    /// Logo location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    /// Accepted subject identifier types.
    #[serde(
        rename = "subject_syntax_types_supported",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subject_identifier_types_supported: Option<Vec<String>>,
    /// Accepted presentation formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vp_formats: Option<VpFormats>,
}

/// Accepted presentation and credential formats.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct VpFormats {
    /// JWT presentations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_vp: Option<AllowedAlgorithms>,
    /// JWT credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_vc: Option<AllowedAlgorithms>,
}

/// Signing algorithms accepted for a format. An absent list accepts any.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AllowedAlgorithms {
    /// Accepted algorithms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<Vec<String>>,
}

/// Whether `list` is absent or contains `value`.
fn allows(list: Option<&Vec<String>>, value: &str) -> bool {
    list.map_or(true, |list| list.iter().any(|item| item == value))
}

/// Validates presentation requests.
pub struct PresentationRequestValidator {
    verifier: Arc<dyn TokenVerifying>,
    logger: Arc<Logger>,
}

impl PresentationRequestValidator {
    /// Creates a validator checking signatures with `verifier`.
    pub fn new(verifier: Arc<dyn TokenVerifying>, logger: Arc<Logger>) -> Self {
        Self { verifier, logger }
    }

    /// Validates `request` at `current_time` against the keys of the DID
    /// document of its signer.
    ///
    /// The following checks are performed, in order:
    /// - `exp` is present and not older than [`CLOCK_SKEW`],
    /// - `scope`, `response_mode` and `response_type` have the supported
    ///   values,
    /// - `registration` is present and accepts DIDs and `ES256K`,
    /// - the signature verifies against the key referenced by `kid`.
    pub fn validate(
        &self,
        request: &PresentationRequestToken,
        keys: &[IdentifierDocumentPublicKey],
        current_time: SecondsSinceEpoch,
    ) -> Result<()> {
        let claims = request.content();

        validate_exp_required(claims.exp, current_time, CLOCK_SKEW)?;
        expect_value(claims.scope.as_deref(), SCOPE, ValidationError::InvalidScopeValue)?;
        expect_value(
            claims.response_mode.as_deref(),
            RESPONSE_MODE,
            ValidationError::InvalidResponseModeValue,
        )?;
        expect_value(
            claims.response_type.as_deref(),
            RESPONSE_TYPE,
            ValidationError::InvalidResponseTypeValue,
        )?;

        let registration = claims
            .registration
            .as_ref()
            .ok_or_else(|| Error::root(ValidationError::NoRegistrationPresent))?;
        validate_registration(registration)?;

        verify_with_document_keys(request, keys, self.verifier.as_ref(), &self.logger)
    }
}

fn expect_value(value: Option<&str>, expected: &str, error: ValidationError) -> Result<()> {
    if value != Some(expected) {
        return Err(Error::root(error).ctx(format!("found {value:?}")));
    }
    Ok(())
}

fn validate_registration(registration: &RegistrationClaims) -> Result<()> {
    if !allows(
        registration.subject_identifier_types_supported.as_ref(),
        SUBJECT_IDENTIFIER_TYPE_DID,
    ) {
        return Err(Error::root(
            ValidationError::SubjectIdentifierTypeNotSupported,
        ));
    }

    let formats = registration.vp_formats.as_ref();

    if !allows(
        formats.and_then(|f| f.jwt_vp.as_ref()?.alg.as_ref()),
        SUPPORTED_SIGNING_ALGORITHM,
    ) {
        return Err(Error::root(
            ValidationError::SigningAlgorithmNotSupportedForVps,
        ));
    }

    if !allows(
        formats.and_then(|f| f.jwt_vc.as_ref()?.alg.as_ref()),
        SUPPORTED_SIGNING_ALGORITHM,
    ) {
        return Err(Error::root(
            ValidationError::SigningAlgorithmNotSupportedForVcs,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bh_crypto::EphemeralSecret;

    use super::*;
    use crate::key_resolution::tests::Keys;

    const NOW: SecondsSinceEpoch = 1_700_000_000;
    const KID: &str = "did:ion:verifier#sign_1";

    fn valid_claims() -> PresentationRequestClaims {
        PresentationRequestClaims {
            client_id: Some("did:ion:verifier".to_owned()),
            response_type: Some(RESPONSE_TYPE.to_owned()),
            response_mode: Some(RESPONSE_MODE.to_owned()),
            scope: Some(SCOPE.to_owned()),
            nonce: Some("n-0S6_WzA2Mj".to_owned()),
            registration: Some(RegistrationClaims {
                client_name: Some("Verifier".to_owned()),
                subject_identifier_types_supported: Some(vec!["did".to_owned()]),
                vp_formats: Some(VpFormats {
                    jwt_vp: Some(AllowedAlgorithms {
                        alg: Some(vec!["ES256K".to_owned(), "EdDSA".to_owned()]),
                    }),
                    jwt_vc: None,
                }),
                ..Default::default()
            }),
            iat: Some(NOW - 10),
            exp: Some(NOW + 3600),
            ..Default::default()
        }
    }

    struct Fixture {
        keys: Keys,
        secret: EphemeralSecret,
        document: Vec<IdentifierDocumentPublicKey>,
        validator: PresentationRequestValidator,
    }

    impl Fixture {
        fn new() -> Self {
            let keys = Keys::new();
            let secret = EphemeralSecret::generate(32).unwrap();
            let document = vec![keys.document_key("#sign_1", &secret)];
            let validator = PresentationRequestValidator::new(
                Arc::new(Keys::new().verifier),
                Arc::new(Logger::silent()),
            );
            Self {
                keys,
                secret,
                document,
                validator,
            }
        }

        fn validate(&self, claims: PresentationRequestClaims) -> Result<()> {
            let token = self.keys.signed(KID, claims, &self.secret);
            let parsed = PresentationRequestToken::parse(&token.serialize()).unwrap();
            self.validator.validate(&parsed, &self.document, NOW)
        }
    }

    #[test]
    fn valid_request() {
        Fixture::new().validate(valid_claims()).unwrap();
    }

    #[test]
    fn expiration_boundary() {
        let fixture = Fixture::new();

        let claims = PresentationRequestClaims {
            exp: Some(NOW - 299),
            ..valid_claims()
        };
        fixture.validate(claims).unwrap();

        let claims = PresentationRequestClaims {
            exp: Some(NOW - 301),
            ..valid_claims()
        };
        let err = fixture.validate(claims).unwrap_err();
        assert_eq!(err.error, ValidationError::TokenExpired(NOW, NOW - 301));

        let claims = PresentationRequestClaims {
            exp: None,
            ..valid_claims()
        };
        let err = fixture.validate(claims).unwrap_err();
        assert_eq!(err.error, ValidationError::NoExpirationPresent);
    }

    #[test]
    fn protocol_constants_are_enforced() {
        let fixture = Fixture::new();

        let cases = [
            (
                PresentationRequestClaims {
                    scope: Some("profile".to_owned()),
                    ..valid_claims()
                },
                ValidationError::InvalidScopeValue,
            ),
            (
                PresentationRequestClaims {
                    response_mode: None,
                    ..valid_claims()
                },
                ValidationError::InvalidResponseModeValue,
            ),
            (
                PresentationRequestClaims {
                    response_type: Some("code".to_owned()),
                    ..valid_claims()
                },
                ValidationError::InvalidResponseTypeValue,
            ),
            (
                PresentationRequestClaims {
                    registration: None,
                    ..valid_claims()
                },
                ValidationError::NoRegistrationPresent,
            ),
        ];

        for (claims, expected) in cases {
            assert_eq!(fixture.validate(claims).unwrap_err().error, expected);
        }
    }

    #[test]
    fn registration_must_accept_dids_and_es256k() {
        let fixture = Fixture::new();
        let with_registration = |registration: RegistrationClaims| PresentationRequestClaims {
            registration: Some(registration),
            ..valid_claims()
        };

        let err = fixture
            .validate(with_registration(RegistrationClaims {
                subject_identifier_types_supported: Some(vec!["jkt".to_owned()]),
                ..Default::default()
            }))
            .unwrap_err();
        assert_eq!(err.error, ValidationError::SubjectIdentifierTypeNotSupported);

        let only_eddsa = Some(AllowedAlgorithms {
            alg: Some(vec!["EdDSA".to_owned()]),
        });

        let err = fixture
            .validate(with_registration(RegistrationClaims {
                vp_formats: Some(VpFormats {
                    jwt_vp: only_eddsa.clone(),
                    jwt_vc: None,
                }),
                ..Default::default()
            }))
            .unwrap_err();
        assert_eq!(err.error, ValidationError::SigningAlgorithmNotSupportedForVps);

        let err = fixture
            .validate(with_registration(RegistrationClaims {
                vp_formats: Some(VpFormats {
                    jwt_vp: Some(AllowedAlgorithms { alg: None }),
                    jwt_vc: only_eddsa,
                }),
                ..Default::default()
            }))
            .unwrap_err();
        assert_eq!(err.error, ValidationError::SigningAlgorithmNotSupportedForVcs);

        fixture
            .validate(with_registration(RegistrationClaims::default()))
            .unwrap();
    }

    #[test]
    fn signature_is_checked_last() {
        let fixture = Fixture::new();
        let other = EphemeralSecret::generate(32).unwrap();

        let token = fixture.keys.signed(KID, valid_claims(), &other);
        let err = fixture
            .validator
            .validate(&token, &fixture.document, NOW)
            .unwrap_err();
        assert_eq!(err.error, ValidationError::InvalidSignature);

        let token = fixture.keys.signed("did:ion:verifier", valid_claims(), &fixture.secret);
        let err = fixture
            .validator
            .validate(&token, &fixture.document, NOW)
            .unwrap_err();
        assert_matches!(err.error, ValidationError::KeyIdMalformed(_));
    }

    #[test]
    fn fractional_expiration_is_checked_against_the_skew() {
        let fixture = Fixture::new();
        let mut token = serde_json::to_value(valid_claims()).unwrap();

        token["exp"] = serde_json::json!(1_699_999_700.5);
        let claims: PresentationRequestClaims = serde_json::from_value(token.clone()).unwrap();
        assert_eq!(claims.exp, Some(NOW - 300));
        fixture.validate(claims).unwrap();

        token["exp"] = serde_json::json!(1_699_999_698.9);
        let claims: PresentationRequestClaims = serde_json::from_value(token).unwrap();
        let err = fixture.validate(claims).unwrap_err();
        assert_eq!(err.error, ValidationError::TokenExpired(NOW, NOW - 302));
    }

    #[test]
    fn claims_use_protocol_names() {
        let claims: PresentationRequestClaims = serde_json::from_str(
            r#"{
                "response_type": "id_token",
                "response_mode": "post",
                "scope": "openid",
                "exp": 1700003600,
                "registration": {
                    "client_name": "Verifier",
                    "subject_syntax_types_supported": ["did"],
                    "vp_formats": {"jwt_vp": {"alg": ["ES256K"]}}
                }
            }"#,
        )
        .unwrap();

        let registration = claims.registration.unwrap();
        assert_eq!(
            registration.subject_identifier_types_supported,
            Some(vec!["did".to_owned()])
        );
        assert_eq!(
            registration.vp_formats.unwrap().jwt_vp.unwrap().alg,
            Some(vec!["ES256K".to_owned()])
        );
    }
}
