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

use serde::{Deserialize, Serialize};

use crate::Jwk;

/// The JOSE header shared by JWS and JWE tokens.
///
/// Every member is optional; absent members are not serialized.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// Media type of the whole token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Signing or key management algorithm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Content encryption method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enc: Option<String>,
    /// Embedded public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwk: Option<Jwk>,
    /// Identifier of the signing key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Media type of the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
    /// PBES2 salt input, `base64url`-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2s: Option<String>,
    /// PBES2 iteration count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2c: Option<u32>,
}

impl Header {
    /// Header of a JWT signed with `alg` by the key `kid`.
    pub fn jwt(alg: impl Into<String>, kid: impl Into<String>) -> Self {
        Self {
            typ: Some("JWT".to_owned()),
            alg: Some(alg.into()),
            kid: Some(kid.into()),
            ..Default::default()
        }
    }
}
