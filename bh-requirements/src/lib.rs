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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate describes what a verified ID request needs from the wallet,
//! and checks what the holder provides against it.
//!
//! # Details
//!
//! A [`Requirement`] is a closed set of kinds: verified IDs, self-attested
//! claims, pins, id tokens, access tokens and groups of those. Each kind is
//! fulfilled at most once and then validated. A required requirement which is
//! not fulfilled is invalid.
//!
//! Verified ID requirements carry a [`Constraint`] on the
//! [`VerifiedIdCandidate`]s the wallet holds:
//!
//! - a [`VcTypeConstraint`] requires a declared type;
//! - a [`FieldConstraint`] requires a claim under one of several
//!   [`JsonPath`]s to match a case-insensitive [`Pattern`];
//! - a [`GroupConstraint`] combines constraints.
//!
//! Groups of requirements and of constraints share the same semantics. A
//! [`GroupOperator::All`] group fails with the error of its first failing
//! member, and an [`GroupOperator::Any`] group fails only if every member
//! does, reporting all of them.
//!
//! # Examples
//!
//! ## Fulfill a verified ID requirement
//!
//! ```
//! use bh_requirements::{
//!     FieldConstraint, GroupConstraint, GroupOperator, Requirement, VcTypeConstraint,
//!     VerifiedIdCandidate, VerifiedIdRequirement,
//! };
//! use serde_json::json;
//!
//! let constraint = GroupConstraint::new(
//!     GroupOperator::All,
//!     vec![
//!         VcTypeConstraint::new("EmployeeCard").into(),
//!         FieldConstraint::new(&["$.vc.credentialSubject.name"], Some("/^A.*/"))
//!             .unwrap()
//!             .into(),
//!     ],
//! );
//! let mut requirement =
//!     VerifiedIdRequirement::new(true, vec!["EmployeeCard".to_owned()], constraint.into());
//!
//! let candidates = [VerifiedIdCandidate::new(
//!     "urn:uuid:1",
//!     vec!["VerifiableCredential".to_owned(), "EmployeeCard".to_owned()],
//!     json!({"vc": {"credentialSubject": {"name": "Alice"}}}),
//! )];
//! let matches = requirement.get_matches(&candidates);
//! assert_eq!(matches.len(), 1);
//!
//! requirement.fulfill(matches[0].clone()).unwrap();
//! Requirement::from(requirement).validate().unwrap();
//! ```

mod candidate;
mod constraint;
mod error;
mod json_path;
mod pattern;
mod requirement;

pub use candidate::*;
pub use constraint::*;
pub use error::*;
pub use json_path::*;
pub use pattern::*;
pub use requirement::*;
