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

use bherror::traits::ForeignError;
use regex::{Regex, RegexBuilder};

use crate::error::{RequirementError, Result};

/// A field filter pattern, written as a `/`-delimited regular expression.
///
/// Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `pattern`, stripping the `/` delimiters when present.
    pub fn parse(pattern: &str) -> Result<Self> {
        let expression = pattern
            .strip_prefix('/')
            .and_then(|inner| inner.strip_suffix('/'))
            .unwrap_or(pattern);

        let regex = RegexBuilder::new(expression)
            .case_insensitive(true)
            .build()
            .foreign_err(|| RequirementError::InvalidPattern(pattern.to_owned()))?;

        Ok(Self { regex })
    }

    /// Whether `value` contains a match.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The compiled expression, without delimiters.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}
