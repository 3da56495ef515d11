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
    error::{Mismatch, Mismatches, Result, ValidationError},
    time::{
        deserialize_numeric_date, deserialize_optional_numeric_date, validate_exp_if_present,
        validate_iat_if_present,
    },
    verify_with_document_keys, IdentifierDocument, SecondsSinceEpoch, TokenHeaderKeyId,
    CLOCK_SKEW,
};

/// Claims of a domain linkage credential, a JWT-encoded credential in which
/// a DID claims ownership of a web origin.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DomainLinkageCredentialClaims {
    /// Subject DID.
    pub sub: String,
    /// Issuer DID.
    pub iss: String,
    /// Not-before time.
    #[serde(deserialize_with = "deserialize_numeric_date")]
    pub nbf: SecondsSinceEpoch,
    /// Expiration time.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<SecondsSinceEpoch>,
    /// Issuance time.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<SecondsSinceEpoch>,
    /// The embedded credential.
    pub vc: DomainLinkageCredentialContent,
}

/// The credential embedded in a [`DomainLinkageCredentialClaims`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainLinkageCredentialContent {
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Issuer DID.
    pub issuer: String,
    /// Issuance date, as an RFC 3339 string.
    pub issuance_date: String,
    /// Expiration date, as an RFC 3339 string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    /// Credential types.
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    /// The linked DID and origin.
    pub credential_subject: DomainLinkageCredentialSubject,
}

/// Subject of a domain linkage credential.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DomainLinkageCredentialSubject {
    /// The linked DID.
    pub id: String,
    /// The linked web origin.
    pub origin: String,
}

/// Signed domain linkage credential.
pub type DomainLinkageCredential = JwsToken<DomainLinkageCredentialClaims>;

/// Validates domain linkage credentials.
pub struct DomainLinkageCredentialValidator {
    verifier: Arc<dyn TokenVerifying>,
    logger: Arc<Logger>,
}

impl DomainLinkageCredentialValidator {
    /// Creates a validator checking signatures with `verifier`.
    pub fn new(verifier: Arc<dyn TokenVerifying>, logger: Arc<Logger>) -> Self {
        Self { verifier, logger }
    }

    /// Validates `credential`, fetched from `source_url`, against the DID
    /// document of the linked DID.
    ///
    /// The DID document has to publish keys, and the `kid` of the credential
    /// has to name a DID and a key. All cross-checks between the
    /// credential, the DID document and `source_url` are run, and every
    /// failing one is reported in a single
    /// [`ValidationError::DomainLinkageMismatch`]. The `iat` and `exp`
    /// claims are checked when present, and the signature last.
    pub fn validate(
        &self,
        credential: &DomainLinkageCredential,
        document: &IdentifierDocument,
        source_url: &str,
        current_time: SecondsSinceEpoch,
    ) -> Result<()> {
        let keys = document
            .verification_method
            .as_deref()
            .ok_or_else(|| Error::root(ValidationError::NoPublicKeysInDocument))?;

        let key_id = TokenHeaderKeyId::from_header(credential.headers())?;

        let mismatches = cross_check(credential, &key_id, document, source_url);
        if !mismatches.is_empty() {
            self.logger.info(format!(
                "domain linkage of {} does not match in {} check(s)",
                document.id,
                mismatches.len()
            ));
            return Err(Error::root(ValidationError::DomainLinkageMismatch(
                Mismatches(mismatches),
            )));
        }

        let claims = credential.content();
        validate_iat_if_present(claims.iat, current_time, CLOCK_SKEW)?;
        validate_exp_if_present(claims.exp, current_time, CLOCK_SKEW)?;

        verify_with_document_keys(credential, keys, self.verifier.as_ref(), &self.logger)
    }
}

fn cross_check(
    credential: &DomainLinkageCredential,
    key_id: &TokenHeaderKeyId,
    document: &IdentifierDocument,
    source_url: &str,
) -> Vec<Mismatch> {
    let claims = credential.content();
    let subject = &claims.vc.credential_subject;
    let mut mismatches = Vec::new();

    if claims.iss != subject.id {
        mismatches.push(Mismatch::TokenIssuer(subject.id.clone(), claims.iss.clone()));
    }
    if claims.sub != subject.id {
        mismatches.push(Mismatch::TokenSubject(subject.id.clone(), claims.sub.clone()));
    }
    if document.id != subject.id {
        mismatches.push(Mismatch::DocumentId(subject.id.clone(), document.id.clone()));
    }
    if source_url != subject.origin {
        mismatches.push(Mismatch::DomainUrl(
            source_url.to_owned(),
            subject.origin.clone(),
        ));
    }

    if key_id.did != document.id {
        mismatches.push(Mismatch::KeyIdDid(
            key_id.did.clone(),
            document.id.clone(),
        ));
    }

    mismatches
}
