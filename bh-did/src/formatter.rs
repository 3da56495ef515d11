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

//! Canonical encoding of ION long-form DIDs.
//!
//! Every document below declares its fields in lexicographic order of their
//! serialized names, so `serde_json` emits sorted-key JSON without any
//! canonicalization pass.

use bh_jose::{base64_url_encode, EcPublicJwk};
use bherror::traits::ForeignError as _;
use serde::{Deserialize, Serialize};

use crate::{
    error::{IdentifierError, Result},
    Multihash,
};

/// Prefix of every ION DID.
pub const ION_PREFIX: &str = "did:ion:";

/// Verification method type of the published keys.
pub const PUBLIC_KEY_TYPE: &str = "EcdsaSecp256k1VerificationKey2019";

/// Purpose of the published keys.
pub const AUTHENTICATION_PURPOSE: &str = "authentication";

const REPLACE_ACTION: &str = "replace";

/// A service endpoint published in the DID document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Identifier of the service.
    pub id: String,
    /// Location of the service.
    #[serde(rename = "serviceEndpoint")]
    pub service_endpoint: String,
    /// Type of the service.
    #[serde(rename = "type")]
    pub service_type: String,
}

#[derive(Serialize)]
struct IonPublicKey<'a> {
    id: &'a str,
    #[serde(rename = "publicKeyJwk")]
    public_key_jwk: &'a EcPublicJwk,
    purposes: [&'static str; 1],
    #[serde(rename = "type")]
    key_type: &'static str,
}

#[derive(Serialize)]
struct IonDocument<'a> {
    #[serde(rename = "publicKeys")]
    public_keys: Vec<IonPublicKey<'a>>,
    services: &'a [ServiceEndpoint],
}

#[derive(Serialize)]
struct IonPatch<'a> {
    action: &'static str,
    document: IonDocument<'a>,
}

#[derive(Serialize)]
struct IonDelta<'a> {
    patches: [IonPatch<'a>; 1],
    #[serde(rename = "updateCommitment")]
    update_commitment: String,
}

#[derive(Serialize)]
struct IonSuffixData {
    #[serde(rename = "deltaHash")]
    delta_hash: String,
    #[serde(rename = "recoveryCommitment")]
    recovery_commitment: String,
}

#[derive(Serialize)]
struct IonInitialState<'a> {
    delta: IonDelta<'a>,
    #[serde(rename = "suffixData")]
    suffix_data: IonSuffixData,
}

/// Builds ION long-form DIDs from public keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierFormatter {
    multihash: Multihash,
}

impl IdentifierFormatter {
    /// Creates a formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the long-form DID
    /// `did:ion:<base64url(hash(suffixData))>:<base64url({delta, suffixData})>`
    /// publishing `document_keys` and `services`.
    ///
    /// `hash` is the SHA-256 [`Multihash`]. The `update_key` and the
    /// `recovery_key` only enter the DID through their commitments.
    pub fn create_ion_long_form_did(
        &self,
        recovery_key: &EcPublicJwk,
        update_key: &EcPublicJwk,
        document_keys: &[EcPublicJwk],
        services: &[ServiceEndpoint],
    ) -> Result<String> {
        let public_keys = document_keys
            .iter()
            .map(|jwk| IonPublicKey {
                id: jwk.kid.as_deref().unwrap_or_default(),
                public_key_jwk: jwk,
                purposes: [AUTHENTICATION_PURPOSE],
                key_type: PUBLIC_KEY_TYPE,
            })
            .collect();

        let delta = IonDelta {
            patches: [IonPatch {
                action: REPLACE_ACTION,
                document: IonDocument {
                    public_keys,
                    services,
                },
            }],
            update_commitment: self.commitment(update_key)?,
        };

        let suffix_data = IonSuffixData {
            delta_hash: base64_url_encode(self.multihash.compute(&to_json(&delta, "delta")?)),
            recovery_commitment: self.commitment(recovery_key)?,
        };
        let short_form = base64_url_encode(
            self.multihash
                .compute(&to_json(&suffix_data, "suffix data")?),
        );

        let initial_state = IonInitialState { delta, suffix_data };
        let long_form = base64_url_encode(to_json(&initial_state, "initial state")?);

        Ok(format!("{ION_PREFIX}{short_form}:{long_form}"))
    }

    /// The doubly hashed commitment to `jwk`.
    fn commitment(&self, jwk: &EcPublicJwk) -> Result<String> {
        let hash = self.multihash.compute(&to_json(jwk, "commitment key")?);
        Ok(base64_url_encode(self.multihash.compute(&hash)))
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, component: &'static str) -> Result<Vec<u8>> {
    serde_json::to_vec(value).foreign_err(|| IdentifierError::Serialization(component))
}

#[cfg(test)]
mod tests {
    use bh_jose::base64_url_decode;

    use super::*;

    const X: &str = "Ir5lqT2yDCXdWI8HgMj2erz9HVChFFv4Bd70oDqclvs";
    const Y: &str = "_uSQb2NNO3MMnsS83ByMxayGbk3ODYxAlMx-_YOw5oc";

    const EXPECTED_DID: &str = concat!(
        "did:ion:EiBqI3vUhJSlAfpBMqf9K0xTL-qwvsqv3nUSLxB5npih9g:",
        "eyJkZWx0YSI6eyJwYXRjaGVzIjpbeyJhY3Rpb24iOiJyZXBsYWNlIiwiZG9jdW1lbnQiOnsicHVibGljS2V5cyI6W3siaWQiOiJ0ZXN0S2V5IiwicHVibGljS2V5SndrIjp7ImFsZyI6IkVTMjU2SyIsImNydiI6InNlY3AyNTZrMSIsImtleV9vcHMiOlsidmVyaWZ5Il0sImtpZCI6InRlc3RLZXkiLCJrdHkiOiJFQyIsInVzZSI6InNpZyIsIngiOiJJcjVscVQyeURDWGRXSThIZ01qMmVyejlIVkNoRkZ2NEJkNzBvRHFjbHZzIiwieSI6Il91U1FiMk5OTzNNTW5zUzgzQnlNeGF5R2JrM09EWXhBbE14LV9ZT3c1b2MifSwicHVycG9zZXMiOlsiYXV0aGVudGljYXRpb24iXSwidHlwZSI6IkVjZHNhU2VjcDI1NmsxVmVyaWZpY2F0aW9uS2V5MjAxOSJ9XSwic2VydmljZXMiOltdfX1dLCJ1cGRhdGVDb21taXRtZW50IjoiRWlBSDMtLTg0cng5VjFLaUNtUWJOT2F2a0NxRS1aVy16ZEJjYkNBZzVjYklCZyJ9LCJzdWZmaXhEYXRhIjp7ImRlbHRhSGFzaCI6IkVpRDQ4N25LaFlvaFY5c004MEYxMEgwSmJHOXhyaTJKcDJPRk1aRmFKREhXWXciLCJyZWNvdmVyeUNvbW1pdG1lbnQiOiJFaUFIMy0tODRyeDlWMUtpQ21RYk5PYXZrQ3FFLVpXLXpkQmNiQ0FnNWNiSUJnIn19",
    );

    fn test_key() -> EcPublicJwk {
        EcPublicJwk::secp256k1(
            &base64_url_decode(X).unwrap(),
            &base64_url_decode(Y).unwrap(),
            "testKey",
        )
    }

    #[test]
    fn long_form_did_is_byte_exact() {
        let key = test_key();

        let did = IdentifierFormatter::new()
            .create_ion_long_form_did(&key, &key, &[key.clone()], &[])
            .unwrap();

        assert_eq!(did, EXPECTED_DID);
    }

    #[test]
    fn commitment_is_double_multihash() {
        assert_eq!(
            IdentifierFormatter::new().commitment(&test_key()).unwrap(),
            "EiAH3--84rx9V1KiCmQbNOavkCqE-ZW-zdBcbCAg5cbIBg"
        );
    }

    #[test]
    fn long_form_payload_carries_delta_and_suffix_data() {
        let key = test_key();
        let service = ServiceEndpoint {
            id: "hub".to_owned(),
            service_endpoint: "https://hub.example.com".to_owned(),
            service_type: "IdentityHub".to_owned(),
        };

        let did = IdentifierFormatter::new()
            .create_ion_long_form_did(&key, &key, &[key.clone()], &[service])
            .unwrap();

        let (short_form, long_form) = did
            .strip_prefix(ION_PREFIX)
            .unwrap()
            .split_once(':')
            .unwrap();
        let state: serde_json::Value =
            serde_json::from_slice(&base64_url_decode(long_form).unwrap()).unwrap();

        let document = &state["delta"]["patches"][0]["document"];
        assert_eq!(document["services"][0]["serviceEndpoint"], "https://hub.example.com");
        assert_eq!(document["publicKeys"][0]["id"], "testKey");

        let suffix_data = serde_json::to_vec(&state["suffixData"]).unwrap();
        assert_eq!(
            short_form,
            base64_url_encode(Multihash.compute(&suffix_data))
        );
        assert_ne!(did, EXPECTED_DID);
    }
}
