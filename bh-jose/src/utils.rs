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

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bherror::traits::{ErrorContext as _, ForeignError as _};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{FormatError, Result};

/// Returns the `base64url`-encoded string of the given `input`.
pub fn base64_url_encode<T: AsRef<[u8]>>(input: T) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Decodes the given `payload` as the `base64url`-encoded string **without
/// padding** into bytes.
pub fn base64_url_decode<T: AsRef<[u8]>>(
    payload: T,
) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(payload)
}

/// Serializes `value` to compact JSON and `base64url`-encodes it.
pub fn encode_json_part<T: Serialize + ?Sized>(
    value: &T,
    component: &'static str,
) -> Result<String, FormatError> {
    let json = serde_json::to_vec(value).foreign_err(|| FormatError::Serialization(component))?;
    Ok(base64_url_encode(json))
}

/// Decodes a `base64url` token part.
pub(crate) fn decode_part(part: &str, component: &'static str) -> Result<Vec<u8>, FormatError> {
    base64_url_decode(part)
        .foreign_err(|| FormatError::UnableToParseToken(component))
        .ctx(|| format!("{component} is not valid base64url"))
}

/// Decodes a `base64url` token part holding JSON.
pub(crate) fn decode_json_part<T: DeserializeOwned>(
    part: &str,
    component: &'static str,
) -> Result<T, FormatError> {
    let bytes = decode_part(part, component)?;
    serde_json::from_slice(&bytes)
        .foreign_err(|| FormatError::UnableToParseToken(component))
        .ctx(|| format!("{component} is not valid JSON"))
}

/// Splits a compact token into exactly `expected` parts.
pub(crate) fn split_compact(token: &str, expected: usize) -> Result<Vec<&str>, FormatError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != expected {
        return Err(bherror::Error::root(FormatError::MalformedToken(
            expected,
            parts.len(),
        )));
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_requires_exact_part_count() {
        assert_eq!(split_compact("a.b.c", 3).unwrap(), vec!["a", "b", "c"]);

        let err = split_compact("a.b", 3).unwrap_err();
        assert_eq!(err.error, FormatError::MalformedToken(3, 2));
    }

    #[test]
    fn json_part_roundtrips_through_base64url() {
        let encoded = encode_json_part(&serde_json::json!({"a": 1}), "claims").unwrap();
        assert_eq!(encoded, "eyJhIjoxfQ");

        let decoded: serde_json::Value = decode_json_part(&encoded, "claims").unwrap();
        assert_eq!(decoded["a"], 1);
    }

    #[test]
    fn invalid_part_reports_component() {
        let err = decode_json_part::<serde_json::Value>("!!", "header").unwrap_err();
        assert_eq!(err.error, FormatError::UnableToParseToken("header"));
    }
}
