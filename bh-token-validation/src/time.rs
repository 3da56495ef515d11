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

use bherror::Error;
use serde::{de, Deserialize, Deserializer};

use crate::error::{Result, ValidationError};

/// Number of seconds elapsed since the Unix epoch.
pub type SecondsSinceEpoch = u64;

/// Clock skew tolerated when checking token times.
pub const CLOCK_SKEW: SecondsSinceEpoch = 5 * 60;

/// Deserializes a JWT `NumericDate`, dropping any fractional seconds.
pub fn deserialize_numeric_date<'de, D>(
    deserializer: D,
) -> std::result::Result<SecondsSinceEpoch, D::Error>
where
    D: Deserializer<'de>,
{
    numeric_date_from_f64(f64::deserialize(deserializer)?)
}

/// Deserializes an optional JWT `NumericDate`, dropping any fractional
/// seconds.
pub fn deserialize_optional_numeric_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<SecondsSinceEpoch>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)?
        .map(numeric_date_from_f64)
        .transpose()
}

fn numeric_date_from_f64<E: de::Error>(value: f64) -> std::result::Result<SecondsSinceEpoch, E> {
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return Err(E::custom(format!("{value} is not a valid NumericDate")));
    }
    Ok(value.floor() as SecondsSinceEpoch)
}

/// Fails if `iat` is present and lies beyond `current_time + skew`.
pub fn validate_iat_if_present(
    iat: Option<SecondsSinceEpoch>,
    current_time: SecondsSinceEpoch,
    skew: SecondsSinceEpoch,
) -> Result<()> {
    match iat {
        Some(iat) if current_time.saturating_add(skew) <= iat => Err(Error::root(
            ValidationError::TokenIssuedInFuture(current_time, iat),
        )),
        _ => Ok(()),
    }
}

/// Fails if `exp` is present and lies at or before `current_time - skew`.
pub fn validate_exp_if_present(
    exp: Option<SecondsSinceEpoch>,
    current_time: SecondsSinceEpoch,
    skew: SecondsSinceEpoch,
) -> Result<()> {
    match exp {
        Some(exp) if current_time.saturating_sub(skew) >= exp => Err(Error::root(
            ValidationError::TokenExpired(current_time, exp),
        )),
        _ => Ok(()),
    }
}

/// Fails if `exp` is absent, or lies before `current_time - skew`.
pub fn validate_exp_required(
    exp: Option<SecondsSinceEpoch>,
    current_time: SecondsSinceEpoch,
    skew: SecondsSinceEpoch,
) -> Result<()> {
    let exp = exp.ok_or_else(|| Error::root(ValidationError::NoExpirationPresent))?;

    if current_time.saturating_sub(skew) > exp {
        return Err(Error::root(ValidationError::TokenExpired(current_time, exp)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const NOW: SecondsSinceEpoch = 1_700_000_000;

    #[test]
    fn required_exp_tolerates_the_skew() {
        validate_exp_required(Some(NOW - 299), NOW, CLOCK_SKEW).unwrap();
        validate_exp_required(Some(NOW - 300), NOW, CLOCK_SKEW).unwrap();
        validate_exp_required(Some(NOW + 3600), NOW, CLOCK_SKEW).unwrap();

        let err = validate_exp_required(Some(NOW - 301), NOW, CLOCK_SKEW).unwrap_err();
        assert_eq!(err.error, ValidationError::TokenExpired(NOW, NOW - 301));

        let err = validate_exp_required(None, NOW, CLOCK_SKEW).unwrap_err();
        assert_eq!(err.error, ValidationError::NoExpirationPresent);
    }

    #[test]
    fn optional_exp() {
        validate_exp_if_present(None, NOW, CLOCK_SKEW).unwrap();
        validate_exp_if_present(Some(NOW - 299), NOW, CLOCK_SKEW).unwrap();

        let err = validate_exp_if_present(Some(NOW - 300), NOW, CLOCK_SKEW).unwrap_err();
        assert_matches!(err.error, ValidationError::TokenExpired(..));
    }

    #[test]
    fn optional_iat() {
        validate_iat_if_present(None, NOW, CLOCK_SKEW).unwrap();
        validate_iat_if_present(Some(NOW + 299), NOW, CLOCK_SKEW).unwrap();

        let err = validate_iat_if_present(Some(NOW + 300), NOW, CLOCK_SKEW).unwrap_err();
        assert_eq!(err.error, ValidationError::TokenIssuedInFuture(NOW, NOW + 300));
    }

    #[derive(Deserialize)]
    struct Times {
        #[serde(deserialize_with = "deserialize_numeric_date")]
        nbf: SecondsSinceEpoch,
        #[serde(default, deserialize_with = "deserialize_optional_numeric_date")]
        exp: Option<SecondsSinceEpoch>,
    }

    #[test]
    fn numeric_dates_may_be_fractional() {
        let times: Times =
            serde_json::from_str(r#"{"nbf": 1700000000, "exp": 1700003600.75}"#).unwrap();
        assert_eq!(times.nbf, NOW);
        assert_eq!(times.exp, Some(NOW + 3600));

        let times: Times = serde_json::from_str(r#"{"nbf": 1700000000.5}"#).unwrap();
        assert_eq!(times.nbf, NOW);
        assert_eq!(times.exp, None);

        let times: Times = serde_json::from_str(r#"{"nbf": 0, "exp": null}"#).unwrap();
        assert_eq!(times.exp, None);
    }

    #[test]
    fn negative_numeric_dates_are_rejected() {
        assert!(serde_json::from_str::<Times>(r#"{"nbf": -1}"#).is_err());
        assert!(serde_json::from_str::<Times>(r#"{"nbf": 0, "exp": "soon"}"#).is_err());
    }

    #[test]
    fn early_clock_does_not_underflow() {
        validate_exp_required(Some(0), 10, CLOCK_SKEW).unwrap();
    }
}
