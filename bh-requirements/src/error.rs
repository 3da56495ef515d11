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

use std::fmt;

/// Error type for constraints and requirements.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum RequirementError {
    /// A field constraint was declared without any path.
    #[strum(to_string = "No paths found on the field")]
    NoPathsFound,

    /// A field constraint was declared with a missing or invalid pattern.
    #[strum(to_string = "Invalid pattern \"{0}\" on the field")]
    InvalidPattern(String),

    /// A list of requirements to reduce is empty.
    #[strum(to_string = "Requirement list is empty")]
    EmptyRequirementList,

    /// The candidate does not declare the required type.
    #[strum(to_string = "Verified ID does not have the type \"{0}\"")]
    TypeNotPresent(String),

    /// No path of a field constraint resolves to a string matching its
    /// pattern.
    #[strum(to_string = "Verified ID does not match the field constraint")]
    FieldNotMatched,

    /// A candidate could not be turned into a JSON tree.
    #[strum(to_string = "Unable to serialize the claims of {0}")]
    ClaimsSerialization(String),

    /// No child of an `ANY` group is satisfied.
    #[strum(to_string = "No member of the group is satisfied: {0}")]
    NoGroupMemberSatisfied(Causes),

    /// A required requirement has not been fulfilled.
    #[strum(to_string = "{0} has not been set")]
    NotFulfilled(&'static str),

    /// A requirement was fulfilled a second time.
    #[strum(to_string = "{0} has already been set")]
    AlreadyFulfilled(&'static str),

    /// The verified ID does not match the constraint of the requirement.
    #[strum(to_string = "Verified ID constraints do not match")]
    ConstraintsNotMatched,

    /// The pin does not have the required length.
    ///
    /// Holds the required and the actual length.
    #[strum(to_string = "Pin must have {0} characters, found {1}")]
    InvalidPinLength(usize, usize),

    /// A numeric pin contains something other than digits.
    #[strum(to_string = "Pin must be numeric")]
    PinNotNumeric,
}

impl bherror::BhError for RequirementError {}

/// The errors of every member of a group.
#[derive(Debug, PartialEq, Clone)]
pub struct Causes(pub Vec<RequirementError>);

impl fmt::Display for Causes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, cause) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{cause}")?;
        }
        f.write_str("]")
    }
}

/// Result type used across the crate.
pub type Result<T> = bherror::Result<T, RequirementError>;
