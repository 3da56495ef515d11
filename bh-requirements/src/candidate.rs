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
use serde::Serialize;
use serde_json::Value;

use crate::error::{RequirementError, Result};

/// A verified ID held by the wallet, as seen by constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdCandidate {
    id: String,
    types: Vec<String>,
    claims: Value,
}

impl VerifiedIdCandidate {
    /// Creates a candidate from its claims, already in JSON form.
    pub fn new(id: impl Into<String>, types: Vec<String>, claims: Value) -> Self {
        Self {
            id: id.into(),
            types,
            claims,
        }
    }

    /// Creates a candidate from typed claims, which are turned into a JSON
    /// tree.
    pub fn from_claims<T: Serialize>(
        id: impl Into<String>,
        types: Vec<String>,
        claims: &T,
    ) -> Result<Self> {
        let id = id.into();
        let claims = serde_json::to_value(claims)
            .foreign_err(|| RequirementError::ClaimsSerialization(id.clone()))?;

        Ok(Self { id, types, claims })
    }

    /// Id of the verified ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared types.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Claims, as a JSON tree.
    pub fn claims(&self) -> &Value {
        &self.claims
    }

    /// Whether `vc_type` is among the declared types.
    pub fn has_type(&self, vc_type: &str) -> bool {
        self.types.iter().any(|t| t == vc_type)
    }
}
