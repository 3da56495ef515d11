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
use serde_json::Value;

use crate::{
    error::{Causes, RequirementError, Result},
    JsonPath, Pattern, VerifiedIdCandidate,
};

/// How the members of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOperator {
    /// Every member has to be satisfied.
    All,
    /// At least one member has to be satisfied.
    Any,
}

/// A condition on the verified IDs which may fulfill a requirement.
///
/// [`Constraint::does_match`] only answers whether the candidate matches,
/// while [`Constraint::matches`] also explains why it does not.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// See [`VcTypeConstraint`].
    VcType(VcTypeConstraint),
    /// See [`FieldConstraint`].
    Field(FieldConstraint),
    /// See [`GroupConstraint`].
    Group(GroupConstraint),
}

impl Constraint {
    /// Whether `candidate` satisfies the constraint.
    pub fn does_match(&self, candidate: &VerifiedIdCandidate) -> bool {
        match self {
            Constraint::VcType(constraint) => constraint.does_match(candidate),
            Constraint::Field(constraint) => constraint.does_match(candidate),
            Constraint::Group(constraint) => constraint.does_match(candidate),
        }
    }

    /// Fails with the reason `candidate` does not satisfy the constraint.
    pub fn matches(&self, candidate: &VerifiedIdCandidate) -> Result<()> {
        match self {
            Constraint::VcType(constraint) => constraint.matches(candidate),
            Constraint::Field(constraint) => constraint.matches(candidate),
            Constraint::Group(constraint) => constraint.matches(candidate),
        }
    }
}

/// Requires a declared type, compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcTypeConstraint {
    vc_type: String,
}

impl VcTypeConstraint {
    /// Creates a constraint requiring `vc_type`.
    pub fn new(vc_type: impl Into<String>) -> Self {
        Self {
            vc_type: vc_type.into(),
        }
    }

    /// The required type.
    pub fn vc_type(&self) -> &str {
        &self.vc_type
    }

    fn does_match(&self, candidate: &VerifiedIdCandidate) -> bool {
        candidate.has_type(&self.vc_type)
    }

    fn matches(&self, candidate: &VerifiedIdCandidate) -> Result<()> {
        if !self.does_match(candidate) {
            return Err(Error::root(RequirementError::TypeNotPresent(
                self.vc_type.clone(),
            )));
        }
        Ok(())
    }
}

/// Requires a claim, found under one of several paths, to match a pattern.
///
/// The paths are tried in order, and the first one resolving to a matching
/// string satisfies the constraint. Paths resolving to anything other than a
/// string are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConstraint {
    paths: Vec<JsonPath>,
    pattern: Pattern,
}

impl FieldConstraint {
    /// Creates a field constraint.
    ///
    /// Fails with [`RequirementError::NoPathsFound`] if `paths` is empty, and
    /// with [`RequirementError::InvalidPattern`] if `pattern` is missing or
    /// does not compile.
    pub fn new<P: AsRef<str>>(paths: &[P], pattern: Option<&str>) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::root(RequirementError::NoPathsFound));
        }

        let pattern = pattern
            .ok_or_else(|| Error::root(RequirementError::InvalidPattern(String::new())))
            .and_then(Pattern::parse)?;

        Ok(Self {
            paths: paths.iter().map(|p| JsonPath::parse(p.as_ref())).collect(),
            pattern,
        })
    }

    /// The paths, in the order they are tried.
    pub fn paths(&self) -> &[JsonPath] {
        &self.paths
    }

    fn does_match(&self, candidate: &VerifiedIdCandidate) -> bool {
        self.paths
            .iter()
            .filter_map(|path| match path.resolve(candidate.claims()) {
                Some(Value::String(value)) => Some(value),
                _ => None,
            })
            .any(|value| self.pattern.is_match(value))
    }

    fn matches(&self, candidate: &VerifiedIdCandidate) -> Result<()> {
        if !self.does_match(candidate) {
            return Err(Error::root(RequirementError::FieldNotMatched)
                .ctx(format!("pattern /{}/", self.pattern.as_str())));
        }
        Ok(())
    }
}

/// Combines constraints with a [`GroupOperator`].
///
/// An `All` group fails with the error of its first unsatisfied member. An
/// `Any` group fails only when no member is satisfied, with every member's
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConstraint {
    operator: GroupOperator,
    constraints: Vec<Constraint>,
}

impl GroupConstraint {
    /// Creates a group of `constraints`.
    pub fn new(operator: GroupOperator, constraints: Vec<Constraint>) -> Self {
        Self {
            operator,
            constraints,
        }
    }

    /// The operator of the group.
    pub fn operator(&self) -> GroupOperator {
        self.operator
    }

    /// The members of the group.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    fn does_match(&self, candidate: &VerifiedIdCandidate) -> bool {
        match self.operator {
            GroupOperator::All => self.constraints.iter().all(|c| c.does_match(candidate)),
            GroupOperator::Any => self.constraints.iter().any(|c| c.does_match(candidate)),
        }
    }

    fn matches(&self, candidate: &VerifiedIdCandidate) -> Result<()> {
        match self.operator {
            GroupOperator::All => self
                .constraints
                .iter()
                .try_for_each(|constraint| constraint.matches(candidate)),
            GroupOperator::Any => {
                let mut causes = Vec::with_capacity(self.constraints.len());
                for constraint in &self.constraints {
                    match constraint.matches(candidate) {
                        Ok(()) => return Ok(()),
                        Err(error) => causes.push(error.error),
                    }
                }
                Err(Error::root(RequirementError::NoGroupMemberSatisfied(
                    Causes(causes),
                )))
            }
        }
    }
}

impl From<VcTypeConstraint> for Constraint {
    fn from(constraint: VcTypeConstraint) -> Self {
        Constraint::VcType(constraint)
    }
}

impl From<FieldConstraint> for Constraint {
    fn from(constraint: FieldConstraint) -> Self {
        Constraint::Field(constraint)
    }
}

impl From<GroupConstraint> for Constraint {
    fn from(constraint: GroupConstraint) -> Self {
        Constraint::Group(constraint)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    pub(crate) fn alice() -> VerifiedIdCandidate {
        VerifiedIdCandidate::new(
            "urn:uuid:alice",
            vec!["VerifiableCredential".to_owned(), "EmployeeCard".to_owned()],
            json!({
                "vc": {
                    "credentialSubject": {"name": "Alice", "age": 42},
                    "evidence": [{"kind": "document"}, {"kind": "in-person"}]
                }
            }),
        )
    }

    pub(crate) fn name_constraint(pattern: &str) -> Constraint {
        FieldConstraint::new(&["$.vc.credentialSubject.name"], Some(pattern))
            .unwrap()
            .into()
    }

    #[test]
    fn type_constraint() {
        assert!(Constraint::from(VcTypeConstraint::new("EmployeeCard")).does_match(&alice()));

        let constraint = Constraint::from(VcTypeConstraint::new("employeecard"));
        assert!(!constraint.does_match(&alice()));
        let err = constraint.matches(&alice()).unwrap_err();
        assert_eq!(
            err.error,
            RequirementError::TypeNotPresent("employeecard".to_owned())
        );
    }

    #[test]
    fn field_constraint() {
        assert!(name_constraint("/^A.*/").does_match(&alice()));
        name_constraint("/^a.*/").matches(&alice()).unwrap();

        let constraint = name_constraint("/^B.*/");
        assert!(!constraint.does_match(&alice()));
        let err = constraint.matches(&alice()).unwrap_err();
        assert_eq!(err.error, RequirementError::FieldNotMatched);
    }

    #[test]
    fn field_paths_are_tried_in_order() {
        let constraint = FieldConstraint::new(
            &[
                "$.vc.credentialSubject.missing",
                "$.vc.credentialSubject.age",
                "$.vc.evidence.0.kind",
                "$.vc.evidence.1.kind",
            ],
            Some("/^in-person$/"),
        )
        .unwrap();

        assert_eq!(constraint.paths().len(), 4);
        assert!(Constraint::from(constraint).does_match(&alice()));
    }

    #[test]
    fn numbers_are_not_matched() {
        let constraint = Constraint::from(
            FieldConstraint::new(&["$.vc.credentialSubject.age"], Some("/42/")).unwrap(),
        );

        assert!(!constraint.does_match(&alice()));
    }

    #[test]
    fn field_construction_errors() {
        let err = FieldConstraint::new::<&str>(&[], Some("/^A/")).unwrap_err();
        assert_eq!(err.error, RequirementError::NoPathsFound);

        let err = FieldConstraint::new(&["$.vc"], None).unwrap_err();
        assert_matches!(err.error, RequirementError::InvalidPattern(_));

        let err = FieldConstraint::new(&["$.vc"], Some("/[/")).unwrap_err();
        assert_eq!(err.error, RequirementError::InvalidPattern("/[/".to_owned()));
    }

    #[test]
    fn all_group_reports_first_failure() {
        let group = Constraint::from(GroupConstraint::new(
            GroupOperator::All,
            vec![
                VcTypeConstraint::new("EmployeeCard").into(),
                name_constraint("/^B/"),
                VcTypeConstraint::new("DriversLicense").into(),
            ],
        ));

        assert!(!group.does_match(&alice()));
        let err = group.matches(&alice()).unwrap_err();
        assert_eq!(err.error, RequirementError::FieldNotMatched);
    }

    #[test]
    fn any_group_collects_every_failure() {
        let failing = vec![
            name_constraint("/^B/"),
            VcTypeConstraint::new("DriversLicense").into(),
        ];

        let group = Constraint::from(GroupConstraint::new(GroupOperator::Any, failing.clone()));
        assert!(!group.does_match(&alice()));
        let err = group.matches(&alice()).unwrap_err();
        assert_eq!(
            err.error,
            RequirementError::NoGroupMemberSatisfied(Causes(vec![
                RequirementError::FieldNotMatched,
                RequirementError::TypeNotPresent("DriversLicense".to_owned()),
            ]))
        );

        let mut passing = failing;
        passing.push(name_constraint("/^A/"));
        let group = Constraint::from(GroupConstraint::new(GroupOperator::Any, passing));
        assert!(group.does_match(&alice()));
        group.matches(&alice()).unwrap();
    }

    #[test]
    fn nested_groups() {
        let group = Constraint::from(GroupConstraint::new(
            GroupOperator::All,
            vec![
                VcTypeConstraint::new("EmployeeCard").into(),
                GroupConstraint::new(
                    GroupOperator::Any,
                    vec![name_constraint("/^B/"), name_constraint("/^Al/")],
                )
                .into(),
            ],
        ));

        assert!(group.does_match(&alice()));
        group.matches(&alice()).unwrap();
    }
}
