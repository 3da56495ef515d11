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

use bherror::traits::{ForeignError, PropagateError};
use serde::Deserialize;

use crate::{
    error::{Result, ValidationError},
    DomainLinkageCredential,
};

/// Path under which a web origin publishes its DID configuration.
pub const WELL_KNOWN_CONFIG_PATH: &str = ".well-known/did-configuration.json";

#[derive(Deserialize)]
struct RawWellKnownConfigDocument {
    #[serde(rename = "@context")]
    context: String,
    linked_dids: Vec<String>,
}

/// The DID configuration a web origin publishes at
/// [`WELL_KNOWN_CONFIG_PATH`], listing the DIDs linked to it.
#[derive(Debug, Clone)]
pub struct WellKnownConfigDocument {
    /// JSON-LD context.
    pub context: String,
    /// Domain linkage credentials, one per linked DID.
    pub linked_dids: Vec<DomainLinkageCredential>,
}

impl WellKnownConfigDocument {
    /// Parses a DID configuration document.
    ///
    /// Every `linked_dids` entry must be a compact JWS carrying domain
    /// linkage claims.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawWellKnownConfigDocument = serde_json::from_str(json)
            .foreign_err(|| ValidationError::UnableToParseWellKnownConfig)?;

        let linked_dids = raw
            .linked_dids
            .iter()
            .enumerate()
            .map(|(index, token)| {
                DomainLinkageCredential::parse(token)
                    .with_err(|| ValidationError::UnableToParseLinkedDidToken)
                    .map_err(|e| e.ctx(format!("linked_dids[{index}]")))
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            context: raw.context,
            linked_dids,
        })
    }

    /// Serializes the document, with the credentials in compact form.
    pub fn to_json(&self) -> String {
        let linked_dids: Vec<String> = self
            .linked_dids
            .iter()
            .map(DomainLinkageCredential::serialize)
            .collect();

        serde_json::json!({
            "@context": self.context,
            "linked_dids": linked_dids,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::domain_linkage::tests::{claims, credential, DID};

    const CONTEXT: &str = "https://identity.foundation/.well-known/did-configuration/v1";

    fn config(linked_dids: Value) -> String {
        json!({"@context": CONTEXT, "linked_dids": linked_dids}).to_string()
    }

    #[test]
    fn linked_dids_are_parsed() {
        let token = credential(&format!("{DID}#key-1"), claims()).serialize();

        let document = WellKnownConfigDocument::from_json(&config(json!([token]))).unwrap();

        assert_eq!(document.context, CONTEXT);
        assert_eq!(document.linked_dids.len(), 1);
        assert_eq!(document.linked_dids[0].content(), &claims());
        assert_eq!(
            document.linked_dids[0].headers().kid.as_deref(),
            Some("did:ion:linked#key-1")
        );

        let reparsed = WellKnownConfigDocument::from_json(&document.to_json()).unwrap();
        assert_eq!(reparsed.linked_dids[0].serialize(), token);
    }

    #[test]
    fn bad_linked_did_entry() {
        let token = credential(&format!("{DID}#key-1"), claims()).serialize();

        for bad in ["not-a-jws", "e30.e30.c2ln"] {
            let err = WellKnownConfigDocument::from_json(&config(json!([token, bad]))).unwrap_err();
            assert_eq!(err.error, ValidationError::UnableToParseLinkedDidToken);
        }
    }

    #[test]
    fn bad_document_shape() {
        for json in [
            "{}".to_owned(),
            json!({"@context": CONTEXT}).to_string(),
            json!({"@context": CONTEXT, "linked_dids": "token"}).to_string(),
            "linked_dids".to_owned(),
        ] {
            let err = WellKnownConfigDocument::from_json(&json).unwrap_err();
            assert_eq!(err.error, ValidationError::UnableToParseWellKnownConfig);
        }
    }

    #[test]
    fn empty_configuration() {
        let document = WellKnownConfigDocument::from_json(&config(json!([]))).unwrap();

        assert!(document.linked_dids.is_empty());
    }
}
