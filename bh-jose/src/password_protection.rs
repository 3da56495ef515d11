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

use bh_crypto::{EphemeralSecret, SecretBytes, SecretExt as _};
use bherror::{traits::PropagateError as _, Error};

use crate::{
    error::{JweError, Result},
    utils::base64_url_encode,
    EncryptionMethod, Header, JweToken, KeyAlgorithm,
};

/// Length of the random PBES2 salt input.
pub const SALT_INPUT_LEN: usize = 8;

/// PBES2 iteration count used for protection.
pub const ITERATION_COUNT: u32 = 100_000;

/// Content recovered by [`PasswordProtection::unprotect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedContent {
    /// Media type the content was protected with.
    pub content_type: String,
    /// The content.
    pub content: Vec<u8>,
}

/// Encrypts and decrypts content under a password, as compact
/// `PBES2-HS512+A256KW` / `A256CBC-HS512` JWE tokens.
pub struct PasswordProtection {
    password: SecretBytes,
}

impl PasswordProtection {
    /// Creates a protection keyed by `password`.
    pub fn new(password: impl Into<Vec<u8>>) -> Self {
        Self {
            password: SecretBytes::new(password.into()),
        }
    }

    /// Encrypts `content`, recording `content_type` in the `cty` header.
    pub fn protect(&self, content_type: &str, content: &[u8]) -> Result<String, JweError> {
        let salt_input = EphemeralSecret::generate(SALT_INPUT_LEN)
            .and_then(|salt| salt.with_unprotected_bytes(|bytes| Ok(base64_url_encode(bytes))))
            .with_err(|| JweError::CryptoBackend)?;

        let headers = Header {
            alg: Some(KeyAlgorithm::Pbes2Hs512A256Kw.name().to_owned()),
            enc: Some(EncryptionMethod::A256CbcHs512.name().to_owned()),
            cty: Some(content_type.to_owned()),
            p2s: Some(salt_input),
            p2c: Some(ITERATION_COUNT),
            ..Default::default()
        };

        Ok(JweToken::encrypt(content, &self.password, headers)?.to_compact())
    }

    /// Decrypts a token produced by [`PasswordProtection::protect`].
    pub fn unprotect(&self, compact: &str) -> Result<ProtectedContent, JweError> {
        let token = JweToken::from_compact(compact)?;

        let content_type = token
            .headers()
            .cty
            .clone()
            .ok_or_else(|| Error::root(JweError::InvalidContentType))?;
        let content = token.decrypt(&self.password)?;

        Ok(ProtectedContent {
            content_type,
            content,
        })
    }
}
