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

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{FormatError, Result, SignatureError},
    signing::{TokenSigning, TokenVerifying},
    utils::{base64_url_encode, decode_json_part, decode_part, encode_json_part, split_compact},
    Header, Jwk,
};

/// Number of parts of a compact JWS.
const JWS_PARTS: usize = 3;

/// A JSON Web Signature token with typed claims.
///
/// The protected message `base64url(header).base64url(claims)` is computed
/// once, at construction or parsing, and never recomputed. A parsed token is
/// therefore verified against the exact bytes it was received as.
#[derive(Debug, Clone, PartialEq)]
pub struct JwsToken<T> {
    headers: Header,
    content: T,
    protected_message: String,
    signature: Option<Vec<u8>>,
    raw_value: Option<String>,
}

impl<T: Serialize> JwsToken<T> {
    /// Creates an unsigned token.
    pub fn new(headers: Header, content: T) -> Result<Self, FormatError> {
        let protected_message = format!(
            "{}.{}",
            encode_json_part(&headers, "header")?,
            encode_json_part(&content, "claims")?
        );

        Ok(Self {
            headers,
            content,
            protected_message,
            signature: None,
            raw_value: None,
        })
    }
}

impl<T: DeserializeOwned> JwsToken<T> {
    /// Parses a compact `header.claims.signature` token.
    ///
    /// The original string is retained and returned by
    /// [`JwsToken::serialize`].
    pub fn parse(compact: &str) -> Result<Self, FormatError> {
        let parts = split_compact(compact, JWS_PARTS)?;

        let headers = decode_json_part(parts[0], "header")?;
        let content = decode_json_part(parts[1], "claims")?;
        let signature = decode_part(parts[2], "signature")?;

        Ok(Self {
            headers,
            content,
            protected_message: format!("{}.{}", parts[0], parts[1]),
            signature: Some(signature),
            raw_value: Some(compact.to_owned()),
        })
    }
}

impl<T> JwsToken<T> {
    /// The JOSE header.
    pub fn headers(&self) -> &Header {
        &self.headers
    }

    /// The claims.
    pub fn content(&self) -> &T {
        &self.content
    }

    /// Consumes the token, returning the claims.
    pub fn into_content(self) -> T {
        self.content
    }

    /// The signed `base64url(header).base64url(claims)` string.
    pub fn protected_message(&self) -> &str {
        &self.protected_message
    }

    /// The signature, if the token has been signed or parsed.
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// The compact string the token was parsed from.
    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    /// Returns the compact serialization.
    ///
    /// A parsed token serializes to the exact string it was parsed from. An
    /// unsigned token serializes to its protected message only.
    pub fn serialize(&self) -> String {
        if let Some(raw_value) = &self.raw_value {
            return raw_value.clone();
        }

        match &self.signature {
            Some(signature) => format!(
                "{}.{}",
                self.protected_message,
                base64_url_encode(signature)
            ),
            None => self.protected_message.clone(),
        }
    }

    /// Signs the protected message and stores the signature.
    pub fn sign<S>(&mut self, signer: &S, secret: &dyn bh_crypto::Secret) -> Result<(), SignatureError>
    where
        S: TokenSigning + ?Sized,
    {
        let signature = signer.sign(self.protected_message.as_bytes(), secret)?;
        self.signature = Some(signature);
        self.raw_value = None;
        Ok(())
    }

    /// Checks the signature against `key`.
    ///
    /// An unsigned token does not verify.
    pub fn verify<V>(&self, verifier: &V, key: &Jwk) -> Result<bool, SignatureError>
    where
        V: TokenVerifying + ?Sized,
    {
        match &self.signature {
            Some(signature) => verifier.verify(self.protected_message.as_bytes(), signature, key),
            None => Ok(false),
        }
    }
}
