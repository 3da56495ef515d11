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

use bh_crypto::{Hasher as _, PublicKey, Sha256};
use bherror::traits::{ForeignError as _, PropagateError as _};
use serde::{Deserialize, Serialize};

use crate::{
    error::{FormatError, Result},
    utils::{base64_url_decode, base64_url_encode},
};

/// Key type of elliptic-curve keys.
pub const KTY_EC: &str = "EC";
/// JWK curve name of `secp256k1`.
pub const CRV_SECP256K1: &str = "secp256k1";
/// JWS algorithm of ECDSA over `secp256k1` with SHA-256.
pub const ALG_ES256K: &str = "ES256K";

/// A JSON Web Key as specified in [RFC 7517].
///
/// Key material is kept `base64url`-encoded, the way it appears on the wire.
/// The fields are declared in alphabetical order, so the serialized form has
/// sorted keys.
///
/// [RFC 7517]: https://datatracker.ietf.org/doc/html/rfc7517
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Jwk {
    /// Intended algorithm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Curve name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// Private key, only present on export.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// Permitted operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    /// Key identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Key type.
    pub kty: String,
    /// Intended use.
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    /// X coordinate, or the whole key for Edwards curves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl Jwk {
    /// Decoded X coordinate, if present.
    pub fn x_bytes(&self) -> Result<Option<Vec<u8>>, FormatError> {
        decode_coordinate(self.x.as_deref(), "x")
    }

    /// Decoded Y coordinate, if present.
    pub fn y_bytes(&self) -> Result<Option<Vec<u8>>, FormatError> {
        decode_coordinate(self.y.as_deref(), "y")
    }
}

fn decode_coordinate(
    coordinate: Option<&str>,
    name: &'static str,
) -> Result<Option<Vec<u8>>, FormatError> {
    coordinate
        .map(|value| {
            base64_url_decode(value)
                .foreign_err(|| FormatError::InvalidJwk(format!("\"{name}\" is not base64url")))
        })
        .transpose()
}

/// Public elliptic-curve JWK as published in DID documents.
///
/// The fields are declared in alphabetical order, so the serialized form has
/// sorted keys.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EcPublicJwk {
    /// Intended algorithm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Curve name.
    pub crv: String,
    /// Permitted operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    /// Key identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Key type.
    pub kty: String,
    /// Intended use.
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    /// X coordinate.
    pub x: String,
    /// Y coordinate, absent for Edwards curves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// The members of a JWK that take part in its thumbprint, in lexicographic
/// order.
#[derive(Serialize)]
struct MinimalJwk<'a> {
    crv: &'a str,
    kty: &'a str,
    x: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<&'a str>,
}

impl EcPublicJwk {
    /// Builds an `ES256K` signature verification key from `secp256k1`
    /// coordinates.
    pub fn secp256k1(x: &[u8], y: &[u8], kid: impl Into<String>) -> Self {
        Self {
            alg: Some(ALG_ES256K.to_owned()),
            crv: CRV_SECP256K1.to_owned(),
            key_ops: Some(vec!["verify".to_owned()]),
            kid: Some(kid.into()),
            kty: KTY_EC.to_owned(),
            use_: Some("sig".to_owned()),
            x: base64_url_encode(x),
            y: Some(base64_url_encode(y)),
        }
    }

    /// Builds the JWK of a `secp256k1` [`PublicKey`].
    pub fn from_public_key(key: &PublicKey, kid: impl Into<String>) -> Result<Self, FormatError> {
        if !key.algorithm().eq_ignore_ascii_case(bh_crypto::SECP256K1) {
            return Err(bherror::Error::root(FormatError::InvalidJwk(format!(
                "{} keys are not supported",
                key.algorithm()
            ))));
        }

        let (x, y) = key
            .coordinates()
            .with_err(|| FormatError::InvalidJwk("key is not uncompressed".to_owned()))?;
        Ok(Self::secp256k1(x, y, kid))
    }

    /// Compact JSON of the required members `crv`, `kty`, `x` and, when
    /// present, `y`, in lexicographic order.
    pub fn minimal_form(&self) -> Result<String, FormatError> {
        let minimal = MinimalJwk {
            crv: &self.crv,
            kty: &self.kty,
            x: &self.x,
            y: self.y.as_deref(),
        };
        serde_json::to_string(&minimal).foreign_err(|| FormatError::Serialization("JWK"))
    }

    /// The `base64url`-encoded SHA-256 thumbprint over
    /// [`EcPublicJwk::minimal_form`].
    pub fn thumbprint(&self) -> Result<String, FormatError> {
        let minimal = self.minimal_form()?;
        Ok(base64_url_encode(Sha256.digest(minimal.as_bytes())))
    }

    /// Converts into the general [`Jwk`] model.
    pub fn to_jwk(&self) -> Jwk {
        Jwk {
            alg: self.alg.clone(),
            crv: Some(self.crv.clone()),
            d: None,
            key_ops: self.key_ops.clone(),
            kid: self.kid.clone(),
            kty: self.kty.clone(),
            use_: self.use_.clone(),
            x: Some(self.x.clone()),
            y: self.y.clone(),
        }
    }
}

impl From<EcPublicJwk> for Jwk {
    fn from(value: EcPublicJwk) -> Self {
        value.to_jwk()
    }
}
