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

use bh_jose::Jwk;
use serde::{Deserialize, Serialize};

/// A resolved DID document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierDocument {
    /// The DID.
    pub id: String,
    /// Published public keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<IdentifierDocumentPublicKey>>,
    /// Key references usable for authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<String>>,
    /// Published services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<IdentifierDocumentService>>,
}

/// A public key published in a DID document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierDocumentPublicKey {
    /// Relative id of the key, `#fragment`.
    pub id: String,
    /// Verification method type.
    #[serde(rename = "type")]
    pub key_type: String,
    /// DID controlling the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    /// The key.
    pub public_key_jwk: Jwk,
    /// Purposes the key is published for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purposes: Option<Vec<String>>,
}

/// A service published in a DID document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierDocumentService {
    /// Relative id of the service.
    pub id: String,
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Endpoint of the service, a URL or a structured description.
    pub service_endpoint: serde_json::Value,
}
