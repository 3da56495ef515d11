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

use bherror::{traits::PropagateError, Error};

use crate::{
    error::{Causes, RequirementError, Result},
    Constraint, GroupOperator, VerifiedIdCandidate,
};

/// Pin type which only allows digits.
pub const PIN_TYPE_NUMERIC: &str = "numeric";

/// A piece of information a request needs from the wallet.
///
/// Each kind is fulfilled at most once by the caller, and then validated
/// before the response is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    /// See [`VerifiedIdRequirement`].
    VerifiedId(VerifiedIdRequirement),
    /// See [`SelfAttestedClaimRequirement`].
    SelfAttestedClaim(SelfAttestedClaimRequirement),
    /// See [`PinRequirement`].
    Pin(PinRequirement),
    /// See [`IdTokenRequirement`].
    IdToken(IdTokenRequirement),
    /// See [`AccessTokenRequirement`].
    AccessToken(AccessTokenRequirement),
    /// See [`GroupRequirement`].
    Group(GroupRequirement),
}

impl Requirement {
    /// Whether the request cannot proceed without this requirement.
    pub fn required(&self) -> bool {
        match self {
            Requirement::VerifiedId(r) => r.required,
            Requirement::SelfAttestedClaim(r) => r.required,
            Requirement::Pin(r) => r.required,
            Requirement::IdToken(r) => r.required,
            Requirement::AccessToken(r) => r.required,
            Requirement::Group(r) => r.required,
        }
    }

    /// Fails if a required requirement is not fulfilled, or the fulfilled
    /// value breaks a rule of its kind.
    pub fn validate(&self) -> Result<()> {
        match self {
            Requirement::VerifiedId(r) => r.validate(),
            Requirement::SelfAttestedClaim(r) => r.validate(),
            Requirement::Pin(r) => r.validate(),
            Requirement::IdToken(r) => r.validate(),
            Requirement::AccessToken(r) => r.validate(),
            Requirement::Group(r) => r.validate(),
        }
    }

    /// Reduces `requirements` to a single one.
    ///
    /// A single requirement is returned as is, and several ones are grouped
    /// in a required [`GroupOperator::All`] group.
    pub fn reduce(mut requirements: Vec<Requirement>) -> Result<Requirement> {
        if requirements.len() > 1 {
            return Ok(GroupRequirement::new(true, GroupOperator::All, requirements).into());
        }

        requirements
            .pop()
            .ok_or_else(|| Error::root(RequirementError::EmptyRequirementList))
    }
}

fn fulfill_once<T>(slot: &mut Option<T>, value: T, kind: &'static str) -> Result<()> {
    if slot.is_some() {
        return Err(Error::root(RequirementError::AlreadyFulfilled(kind)));
    }
    *slot = Some(value);
    Ok(())
}

fn fulfilled<'a, T>(
    slot: &'a Option<T>,
    required: bool,
    kind: &'static str,
) -> Result<Option<&'a T>> {
    match slot {
        None if required => Err(Error::root(RequirementError::NotFulfilled(kind))),
        slot => Ok(slot.as_ref()),
    }
}

/// Requires a verified ID satisfying a [`Constraint`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdRequirement {
    required: bool,
    types: Vec<String>,
    purpose: Option<String>,
    id: Option<String>,
    issuance_options: Vec<String>,
    constraint: Constraint,
    selected: Option<VerifiedIdCandidate>,
}

impl VerifiedIdRequirement {
    const KIND: &'static str = "Verified ID";

    /// Creates a requirement for a verified ID of one of `types`, matching
    /// `constraint`.
    pub fn new(required: bool, types: Vec<String>, constraint: Constraint) -> Self {
        Self {
            required,
            types,
            purpose: None,
            id: None,
            issuance_options: Vec::new(),
            constraint,
            selected: None,
        }
    }

    /// Sets why the verified ID is requested.
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Sets the id of the requirement within its request.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the URLs of requests issuing a matching verified ID.
    pub fn with_issuance_options(mut self, issuance_options: Vec<String>) -> Self {
        self.issuance_options = issuance_options;
        self
    }

    /// Accepted types.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Why the verified ID is requested.
    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    /// Id of the requirement within its request.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// URLs of requests issuing a matching verified ID.
    pub fn issuance_options(&self) -> &[String] {
        &self.issuance_options
    }

    /// The constraint a verified ID has to satisfy.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// The verified ID fulfilling the requirement.
    pub fn selected(&self) -> Option<&VerifiedIdCandidate> {
        self.selected.as_ref()
    }

    /// The candidates satisfying the constraint.
    pub fn get_matches<'a>(
        &self,
        candidates: &'a [VerifiedIdCandidate],
    ) -> Vec<&'a VerifiedIdCandidate> {
        candidates
            .iter()
            .filter(|candidate| self.constraint.does_match(candidate))
            .collect()
    }

    /// Fulfills the requirement with `candidate`, which has to satisfy the
    /// constraint.
    pub fn fulfill(&mut self, candidate: VerifiedIdCandidate) -> Result<()> {
        if self.selected.is_some() {
            return Err(Error::root(RequirementError::AlreadyFulfilled(Self::KIND)));
        }
        self.constraint
            .matches(&candidate)
            .with_err(|| RequirementError::ConstraintsNotMatched)
            .map_err(|e| e.ctx(format!("candidate {}", candidate.id())))?;

        self.selected = Some(candidate);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        match fulfilled(&self.selected, self.required, Self::KIND)? {
            Some(candidate) => self
                .constraint
                .matches(candidate)
                .with_err(|| RequirementError::ConstraintsNotMatched),
            None => Ok(()),
        }
    }
}

/// Requires a claim the holder enters themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfAttestedClaimRequirement {
    required: bool,
    claim: String,
    value: Option<String>,
}

impl SelfAttestedClaimRequirement {
    const KIND: &'static str = "Self attested claim";

    /// Creates a requirement for `claim`.
    pub fn new(required: bool, claim: impl Into<String>) -> Self {
        Self {
            required,
            claim: claim.into(),
            value: None,
        }
    }

    /// Name of the claim.
    pub fn claim(&self) -> &str {
        &self.claim
    }

    /// The entered value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Fulfills the requirement with the entered value.
    pub fn fulfill(&mut self, value: impl Into<String>) -> Result<()> {
        fulfill_once(&mut self.value, value.into(), Self::KIND)
    }

    fn validate(&self) -> Result<()> {
        fulfilled(&self.value, self.required, Self::KIND).map(|_| ())
    }
}

/// Requires a pin of a fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRequirement {
    required: bool,
    length: usize,
    pin_type: String,
    salt: Option<String>,
    pin: Option<String>,
}

impl PinRequirement {
    const KIND: &'static str = "Pin";

    /// Creates a requirement for a pin of `length` characters.
    ///
    /// A [`PIN_TYPE_NUMERIC`] pin may only contain digits.
    pub fn new(
        required: bool,
        length: usize,
        pin_type: impl Into<String>,
        salt: Option<String>,
    ) -> Self {
        Self {
            required,
            length,
            pin_type: pin_type.into(),
            salt,
            pin: None,
        }
    }

    /// Required number of characters.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Type of the pin.
    pub fn pin_type(&self) -> &str {
        &self.pin_type
    }

    /// Salt to hash the pin with.
    pub fn salt(&self) -> Option<&str> {
        self.salt.as_deref()
    }

    /// The entered pin.
    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    /// Fulfills the requirement with the entered pin.
    pub fn fulfill(&mut self, pin: impl Into<String>) -> Result<()> {
        fulfill_once(&mut self.pin, pin.into(), Self::KIND)
    }

    fn validate(&self) -> Result<()> {
        let Some(pin) = fulfilled(&self.pin, self.required, Self::KIND)? else {
            return Ok(());
        };

        let length = pin.chars().count();
        if length != self.length {
            return Err(Error::root(RequirementError::InvalidPinLength(
                self.length,
                length,
            )));
        }
        if self.pin_type == PIN_TYPE_NUMERIC && !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::root(RequirementError::PinNotNumeric));
        }
        Ok(())
    }
}

/// Requires an id token from an OpenID provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTokenRequirement {
    required: bool,
    configuration: String,
    client_id: Option<String>,
    redirect_uri: Option<String>,
    scope: Option<String>,
    nonce: Option<String>,
    id_token: Option<String>,
}

impl IdTokenRequirement {
    const KIND: &'static str = "Id token";

    /// Creates a requirement for an id token of the provider described at
    /// `configuration`.
    pub fn new(
        required: bool,
        configuration: impl Into<String>,
        client_id: Option<String>,
        redirect_uri: Option<String>,
        scope: Option<String>,
    ) -> Self {
        Self {
            required,
            configuration: configuration.into(),
            client_id,
            redirect_uri,
            scope,
            nonce: None,
            id_token: None,
        }
    }

    /// URL of the provider configuration.
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Client id to authenticate with.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Redirect URI to authenticate with.
    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    /// Scope to request.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Nonce the id token has to carry.
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    /// Sets the nonce the id token has to carry.
    pub fn add_nonce(&mut self, nonce: impl Into<String>) {
        self.nonce = Some(nonce.into());
    }

    /// The raw id token.
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    /// Fulfills the requirement with a raw id token.
    pub fn fulfill(&mut self, raw_token: impl Into<String>) -> Result<()> {
        fulfill_once(&mut self.id_token, raw_token.into(), Self::KIND)
    }

    fn validate(&self) -> Result<()> {
        fulfilled(&self.id_token, self.required, Self::KIND).map(|_| ())
    }
}

/// Requires an access token for a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenRequirement {
    required: bool,
    configuration: String,
    client_id: Option<String>,
    resource_id: String,
    scope: String,
    access_token: Option<String>,
}

impl AccessTokenRequirement {
    const KIND: &'static str = "Access token";

    /// Creates a requirement for an access token to `resource_id`.
    pub fn new(
        required: bool,
        configuration: impl Into<String>,
        client_id: Option<String>,
        resource_id: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            required,
            configuration: configuration.into(),
            client_id,
            resource_id: resource_id.into(),
            scope: scope.into(),
            access_token: None,
        }
    }

    /// URL of the authorization server configuration.
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Client id to authenticate with.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// The resource the token grants access to.
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Scope to request.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The raw access token.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Fulfills the requirement with a raw access token.
    pub fn fulfill(&mut self, raw_token: impl Into<String>) -> Result<()> {
        fulfill_once(&mut self.access_token, raw_token.into(), Self::KIND)
    }

    fn validate(&self) -> Result<()> {
        fulfilled(&self.access_token, self.required, Self::KIND).map(|_| ())
    }
}

/// Combines requirements with a [`GroupOperator`].
///
/// An `All` group fails with the error of its first invalid member. An `Any`
/// group is valid as soon as one member is, and otherwise fails with every
/// member's error.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRequirement {
    required: bool,
    operator: GroupOperator,
    requirements: Vec<Requirement>,
}

impl GroupRequirement {
    /// Creates a group of `requirements`.
    pub fn new(required: bool, operator: GroupOperator, requirements: Vec<Requirement>) -> Self {
        Self {
            required,
            operator,
            requirements,
        }
    }

    /// The operator of the group.
    pub fn operator(&self) -> GroupOperator {
        self.operator
    }

    /// The members of the group.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// The members of the group, to be fulfilled.
    pub fn requirements_mut(&mut self) -> &mut [Requirement] {
        &mut self.requirements
    }

    fn validate(&self) -> Result<()> {
        match self.operator {
            GroupOperator::All => self.requirements.iter().try_for_each(Requirement::validate),
            GroupOperator::Any => {
                let mut causes = Vec::with_capacity(self.requirements.len());
                for requirement in &self.requirements {
                    match requirement.validate() {
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

impl From<VerifiedIdRequirement> for Requirement {
    fn from(requirement: VerifiedIdRequirement) -> Self {
        Requirement::VerifiedId(requirement)
    }
}

impl From<SelfAttestedClaimRequirement> for Requirement {
    fn from(requirement: SelfAttestedClaimRequirement) -> Self {
        Requirement::SelfAttestedClaim(requirement)
    }
}

impl From<PinRequirement> for Requirement {
    fn from(requirement: PinRequirement) -> Self {
        Requirement::Pin(requirement)
    }
}

impl From<IdTokenRequirement> for Requirement {
    fn from(requirement: IdTokenRequirement) -> Self {
        Requirement::IdToken(requirement)
    }
}

impl From<AccessTokenRequirement> for Requirement {
    fn from(requirement: AccessTokenRequirement) -> Self {
        Requirement::AccessToken(requirement)
    }
}

impl From<GroupRequirement> for Requirement {
    fn from(requirement: GroupRequirement) -> Self {
        Requirement::Group(requirement)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{
        constraint::tests::{alice, name_constraint},
        VcTypeConstraint,
    };

    fn claim(required: bool, value: Option<&str>) -> Requirement {
        let mut requirement = SelfAttestedClaimRequirement::new(required, "nickname");
        if let Some(value) = value {
            requirement.fulfill(value).unwrap();
        }
        requirement.into()
    }

    fn employee_card(required: bool) -> VerifiedIdRequirement {
        VerifiedIdRequirement::new(
            required,
            vec!["EmployeeCard".to_owned()],
            VcTypeConstraint::new("EmployeeCard").into(),
        )
        .with_purpose("Prove employment")
        .with_id("employee")
    }

    #[test]
    fn unfulfilled_requirements() {
        let err = claim(true, None).validate().unwrap_err();
        assert_eq!(err.error, RequirementError::NotFulfilled("Self attested claim"));

        claim(false, None).validate().unwrap();
        claim(true, Some("ally")).validate().unwrap();

        let err = Requirement::from(IdTokenRequirement::new(
            true,
            "https://login.example.com/.well-known/openid-configuration",
            Some("wallet".to_owned()),
            None,
            Some("openid".to_owned()),
        ))
        .validate()
        .unwrap_err();
        assert_eq!(err.error, RequirementError::NotFulfilled("Id token"));

        let err = Requirement::from(AccessTokenRequirement::new(
            true,
            "https://login.example.com/.well-known/openid-configuration",
            None,
            "https://issuer.example.com",
            "issue",
        ))
        .validate()
        .unwrap_err();
        assert_eq!(err.error, RequirementError::NotFulfilled("Access token"));
    }

    #[test]
    fn fulfilled_only_once() {
        let mut requirement = SelfAttestedClaimRequirement::new(true, "nickname");
        requirement.fulfill("ally").unwrap();

        let err = requirement.fulfill("al").unwrap_err();
        assert_eq!(err.error, RequirementError::AlreadyFulfilled("Self attested claim"));
        assert_eq!(requirement.value(), Some("ally"));

        let mut requirement = AccessTokenRequirement::new(true, "config", None, "resource", "scope");
        requirement.fulfill("token").unwrap();
        assert_matches!(
            requirement.fulfill("token").unwrap_err().error,
            RequirementError::AlreadyFulfilled(_)
        );
        assert_eq!(requirement.access_token(), Some("token"));
        assert_eq!(requirement.resource_id(), "resource");
    }

    #[test]
    fn id_token_nonce() {
        let mut requirement = IdTokenRequirement::new(
            true,
            "https://login.example.com/.well-known/openid-configuration",
            Some("wallet".to_owned()),
            Some("wallet://callback".to_owned()),
            Some("openid".to_owned()),
        );
        requirement.add_nonce("n-0S6_WzA2Mj");
        requirement.fulfill("header.claims.signature").unwrap();

        assert_eq!(requirement.nonce(), Some("n-0S6_WzA2Mj"));
        assert_eq!(requirement.redirect_uri(), Some("wallet://callback"));
        Requirement::from(requirement).validate().unwrap();
    }

    #[test]
    fn pin_rules() {
        let pin = |pin_type: &str, value: &str| {
            let mut requirement = PinRequirement::new(true, 4, pin_type, None);
            requirement.fulfill(value).unwrap();
            Requirement::from(requirement).validate()
        };

        pin(PIN_TYPE_NUMERIC, "1234").unwrap();
        pin("alphanumeric", "12ab").unwrap();

        let err = pin(PIN_TYPE_NUMERIC, "12345").unwrap_err();
        assert_eq!(err.error, RequirementError::InvalidPinLength(4, 5));

        let err = pin(PIN_TYPE_NUMERIC, "12ab").unwrap_err();
        assert_eq!(err.error, RequirementError::PinNotNumeric);

        let requirement = PinRequirement::new(false, 4, PIN_TYPE_NUMERIC, Some("salt".to_owned()));
        assert_eq!(requirement.salt(), Some("salt"));
        Requirement::from(requirement).validate().unwrap();
    }

    #[test]
    fn verified_id_fulfillment() {
        let mut requirement = employee_card(true);
        assert_eq!(requirement.purpose(), Some("Prove employment"));
        assert_eq!(requirement.id(), Some("employee"));

        let err = Requirement::from(requirement.clone()).validate().unwrap_err();
        assert_eq!(err.error, RequirementError::NotFulfilled("Verified ID"));

        let stranger = VerifiedIdCandidate::new(
            "urn:uuid:stranger",
            vec!["DriversLicense".to_owned()],
            serde_json::Value::Null,
        );
        let err = requirement.fulfill(stranger).unwrap_err();
        assert_eq!(err.error, RequirementError::ConstraintsNotMatched);
        assert_eq!(requirement.selected(), None);

        requirement.fulfill(alice()).unwrap();
        assert_eq!(requirement.selected().map(VerifiedIdCandidate::id), Some("urn:uuid:alice"));
        Requirement::from(requirement.clone()).validate().unwrap();

        let err = requirement.fulfill(alice()).unwrap_err();
        assert_eq!(err.error, RequirementError::AlreadyFulfilled("Verified ID"));
    }

    #[test]
    fn verified_id_matches() {
        let requirement = VerifiedIdRequirement::new(
            true,
            vec!["EmployeeCard".to_owned()],
            name_constraint("/^al/"),
        )
        .with_issuance_options(vec!["https://issuer.example.com/request".to_owned()]);

        let bob = VerifiedIdCandidate::new(
            "urn:uuid:bob",
            vec!["EmployeeCard".to_owned()],
            serde_json::json!({"vc": {"credentialSubject": {"name": "Bob"}}}),
        );
        let candidates = [bob, alice()];

        let matches = requirement.get_matches(&candidates);

        assert_eq!(matches, vec![&candidates[1]]);
        assert_eq!(requirement.issuance_options().len(), 1);
    }

    #[test]
    fn all_group_fails_with_the_failing_member() {
        let group = Requirement::from(GroupRequirement::new(
            true,
            GroupOperator::All,
            vec![
                claim(true, Some("ally")),
                claim(true, None),
                claim(true, Some("al")),
            ],
        ));

        let err = group.validate().unwrap_err();
        assert_eq!(err.error, RequirementError::NotFulfilled("Self attested claim"));
    }

    #[test]
    fn any_group() {
        let group = Requirement::from(GroupRequirement::new(
            true,
            GroupOperator::Any,
            vec![
                claim(true, Some("ally")),
                claim(true, None),
                claim(true, Some("al")),
            ],
        ));
        group.validate().unwrap();

        let group = Requirement::from(GroupRequirement::new(
            true,
            GroupOperator::Any,
            vec![claim(true, None), employee_card(true).into()],
        ));
        let err = group.validate().unwrap_err();
        assert_eq!(
            err.error,
            RequirementError::NoGroupMemberSatisfied(Causes(vec![
                RequirementError::NotFulfilled("Self attested claim"),
                RequirementError::NotFulfilled("Verified ID"),
            ]))
        );
    }

    #[test]
    fn group_members_are_fulfilled_in_place() {
        let mut group = GroupRequirement::new(
            true,
            GroupOperator::All,
            vec![employee_card(true).into(), claim(false, None)],
        );

        if let Requirement::VerifiedId(requirement) = &mut group.requirements_mut()[0] {
            requirement.fulfill(alice()).unwrap();
        }

        Requirement::from(group).validate().unwrap();
    }

    #[test]
    fn reduce() {
        let err = Requirement::reduce(Vec::new()).unwrap_err();
        assert_eq!(err.error, RequirementError::EmptyRequirementList);

        let single = Requirement::reduce(vec![claim(false, None)]).unwrap();
        assert_eq!(single, claim(false, None));

        let reduced = Requirement::reduce(vec![claim(false, None), claim(true, None)]).unwrap();
        assert!(reduced.required());
        assert_matches!(
            reduced,
            Requirement::Group(group)
                if group.operator() == GroupOperator::All && group.requirements().len() == 2
        );
    }
}
