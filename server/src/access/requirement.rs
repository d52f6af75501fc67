//! Role requirement declarations.
//!
//! Every protected operation declares a [`RoleRequirement`]: an OR-combined
//! set of role values, optionally flagged public or allowed-while-unverified.
//! Requirements are static data attached to operations and validated when
//! the router is built; an invalid declaration aborts startup instead of
//! failing closed (or worse, open) at request time.

use thiserror::Error;

use super::roles::{ConditionalRole, Role};

/// Declared requirement for one protected operation.
///
/// Members combine with OR: the request is authorized if the actor
/// satisfies any one of them. The set is non-empty by construction; the
/// only role-less forms are the explicit `public` and `authenticated`
/// requirements.
#[derive(Debug, Clone)]
pub struct RoleRequirement {
    roles: Vec<Role>,
    public: bool,
    any_authenticated: bool,
    allow_unverified: bool,
}

impl RoleRequirement {
    /// Requirement satisfied by any of the given role members.
    ///
    /// Rejects an empty set at declaration time; an empty OR is satisfiable
    /// by nobody and is always a declaration bug.
    pub fn any<I>(roles: I) -> Result<Self, RequirementError>
    where
        I: IntoIterator<Item = Role>,
    {
        let roles: Vec<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(RequirementError::Empty);
        }
        Ok(Self {
            roles,
            public: false,
            any_authenticated: false,
            allow_unverified: false,
        })
    }

    /// Requirement for a public endpoint: allowed without authentication,
    /// no role members evaluated.
    #[must_use]
    pub const fn public() -> Self {
        Self {
            roles: Vec::new(),
            public: true,
            any_authenticated: false,
            allow_unverified: false,
        }
    }

    /// Requirement satisfied by any authenticated user, regardless of role.
    #[must_use]
    pub const fn authenticated() -> Self {
        Self {
            roles: Vec::new(),
            public: false,
            any_authenticated: true,
            allow_unverified: false,
        }
    }

    /// Exempt this operation from the email-verification deadline.
    #[must_use]
    pub fn allow_unverified(mut self) -> Self {
        self.allow_unverified = true;
        self
    }

    /// Whether the endpoint is public (skips all checks).
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    /// Whether any authenticated user satisfies this requirement.
    #[must_use]
    pub const fn is_any_authenticated(&self) -> bool {
        self.any_authenticated
    }

    /// Whether the verification deadline is waived.
    #[must_use]
    pub const fn allows_unverified(&self) -> bool {
        self.allow_unverified
    }

    /// The declared role members.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

/// Which scope identifiers an endpoint's routing can supply.
///
/// Used to reject requirements that could never be evaluated: a `TeamRole`
/// member on an endpoint whose routes carry no team identifier would
/// silently deny every request, so it is rejected at startup instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeShape {
    /// Routes carry an organization id or slug.
    pub org: bool,
    /// Routes carry a team id or slug.
    pub team: bool,
    /// Routes carry a post id or slug.
    pub post: bool,
    /// Routes carry a subject-user id.
    pub subject: bool,
}

impl ScopeShape {
    /// No scope identifiers (platform-level endpoints).
    #[must_use]
    pub const fn none() -> Self {
        Self {
            org: false,
            team: false,
            post: false,
            subject: false,
        }
    }

    /// Organization scope only.
    #[must_use]
    pub const fn org() -> Self {
        Self {
            org: true,
            team: false,
            post: false,
            subject: false,
        }
    }

    /// Add a team scope.
    #[must_use]
    pub const fn with_team(mut self) -> Self {
        self.team = true;
        self
    }

    /// Add a post scope.
    #[must_use]
    pub const fn with_post(mut self) -> Self {
        self.post = true;
        self
    }

    /// Add a subject-user scope.
    #[must_use]
    pub const fn with_subject(mut self) -> Self {
        self.subject = true;
        self
    }
}

/// A protected operation: name, declared requirement, scope shape.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Stable operation name for logs and startup diagnostics.
    pub name: &'static str,
    /// Declared role requirement.
    pub requirement: RoleRequirement,
    /// Scope identifiers the operation's routes can supply.
    pub scope: ScopeShape,
}

impl Operation {
    /// Validate this declaration against its scope shape.
    pub fn validate(&self) -> Result<(), RequirementError> {
        let req = &self.requirement;

        if req.public && !req.roles.is_empty() {
            return Err(RequirementError::Misconfigured {
                operation: self.name,
                detail: "public requirement also declares role members".into(),
            });
        }

        if !req.public && !req.any_authenticated && req.roles.is_empty() {
            return Err(RequirementError::Empty);
        }

        for role in &req.roles {
            self.validate_member(*role)?;
        }

        Ok(())
    }

    fn validate_member(&self, role: Role) -> Result<(), RequirementError> {
        let misconfigured = |detail: String| RequirementError::Misconfigured {
            operation: self.name,
            detail,
        };

        match role {
            Role::Org(_) => {
                if !self.scope.org {
                    return Err(misconfigured(format!(
                        "org role '{}' declared on an endpoint without org scope",
                        role.as_str()
                    )));
                }
            }
            Role::Team(_) => {
                if !self.scope.team {
                    return Err(misconfigured(format!(
                        "team role '{}' declared on an endpoint without team scope",
                        role.as_str()
                    )));
                }
            }
            Role::Post(_) => {
                if !self.scope.post {
                    return Err(misconfigured(format!(
                        "post role '{}' declared on an endpoint without post scope",
                        role.as_str()
                    )));
                }
            }
            Role::Conditional(cond) => match cond {
                ConditionalRole::OrgMemberIfNoTeam => {
                    if !self.scope.org {
                        return Err(misconfigured(
                            "org_member_if_no_team declared on an endpoint without org scope"
                                .into(),
                        ));
                    }
                }
                ConditionalRole::OrgRoleGteSubject => {
                    if !self.scope.org || !self.scope.subject {
                        return Err(misconfigured(
                            "org_role_gte_subject requires org and subject scope".into(),
                        ));
                    }
                }
                ConditionalRole::TeamRoleGteSubject => {
                    if !self.scope.team || !self.scope.subject {
                        return Err(misconfigured(
                            "team_role_gte_subject requires team and subject scope".into(),
                        ));
                    }
                }
            },
        }

        Ok(())
    }
}

/// Validate a set of operation declarations, as run at router build time.
pub fn validate_operations<'a, I>(operations: I) -> Result<(), RequirementError>
where
    I: IntoIterator<Item = &'a Operation>,
{
    for op in operations {
        op.validate()?;
    }
    Ok(())
}

/// Requirement declaration errors. Build/startup-time defects, never
/// produced while serving traffic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequirementError {
    /// The requirement set is empty.
    #[error("Requirement declares no role members and is not public")]
    Empty,

    /// The requirement cannot be evaluated for the declared scope shape.
    #[error("Misconfigured requirement on '{operation}': {detail}")]
    Misconfigured {
        /// Operation whose declaration is invalid.
        operation: &'static str,
        /// What is wrong with it.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::roles::{OrgRole, PostRole, TeamRole};

    fn op(requirement: RoleRequirement, scope: ScopeShape) -> Operation {
        Operation {
            name: "test.op",
            requirement,
            scope,
        }
    }

    #[test]
    fn test_empty_requirement_rejected_at_construction() {
        let result = RoleRequirement::any([]);
        assert_eq!(result.unwrap_err(), RequirementError::Empty);
    }

    #[test]
    fn test_valid_org_requirement_passes() {
        let req = RoleRequirement::any([Role::Org(OrgRole::Moderator)]).unwrap();
        assert!(op(req, ScopeShape::org()).validate().is_ok());
    }

    #[test]
    fn test_team_role_without_team_scope_rejected() {
        let req = RoleRequirement::any([Role::Team(TeamRole::Moderator)]).unwrap();
        let err = op(req, ScopeShape::org()).validate().unwrap_err();
        assert!(matches!(err, RequirementError::Misconfigured { .. }));
    }

    #[test]
    fn test_post_role_without_post_scope_rejected() {
        let req = RoleRequirement::any([Role::Post(PostRole::Creator)]).unwrap();
        let err = op(req, ScopeShape::org()).validate().unwrap_err();
        assert!(matches!(err, RequirementError::Misconfigured { .. }));
    }

    #[test]
    fn test_subject_conditional_without_subject_scope_rejected() {
        let req =
            RoleRequirement::any([Role::Conditional(ConditionalRole::OrgRoleGteSubject)]).unwrap();
        let err = op(req, ScopeShape::org()).validate().unwrap_err();
        assert!(matches!(err, RequirementError::Misconfigured { .. }));

        let req =
            RoleRequirement::any([Role::Conditional(ConditionalRole::TeamRoleGteSubject)]).unwrap();
        let err = op(req, ScopeShape::org().with_team())
            .validate()
            .unwrap_err();
        assert!(matches!(err, RequirementError::Misconfigured { .. }));
    }

    #[test]
    fn test_subject_conditionals_with_full_scope_pass() {
        let req =
            RoleRequirement::any([Role::Conditional(ConditionalRole::OrgRoleGteSubject)]).unwrap();
        assert!(op(req, ScopeShape::org().with_subject()).validate().is_ok());

        let req =
            RoleRequirement::any([Role::Conditional(ConditionalRole::TeamRoleGteSubject)]).unwrap();
        assert!(op(req, ScopeShape::org().with_team().with_subject())
            .validate()
            .is_ok());
    }

    #[test]
    fn test_public_with_role_members_rejected() {
        // Keep declarations honest: members behind a public flag are
        // unreachable and flag a copy-paste mistake.
        let mut req = RoleRequirement::public();
        req.roles.push(Role::Org(OrgRole::Member));
        let err = op(req, ScopeShape::org()).validate().unwrap_err();
        assert!(matches!(err, RequirementError::Misconfigured { .. }));
    }

    #[test]
    fn test_public_and_authenticated_pass_without_members() {
        assert!(op(RoleRequirement::public(), ScopeShape::none())
            .validate()
            .is_ok());
        assert!(op(RoleRequirement::authenticated(), ScopeShape::none())
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_operations_reports_first_failure() {
        let good = op(
            RoleRequirement::any([Role::Org(OrgRole::Member)]).unwrap(),
            ScopeShape::org(),
        );
        let bad = op(
            RoleRequirement::any([Role::Team(TeamRole::Owner)]).unwrap(),
            ScopeShape::org(),
        );

        assert!(validate_operations([&good]).is_ok());
        assert!(validate_operations([&good, &bad]).is_err());
    }

    #[test]
    fn test_allow_unverified_modifier() {
        let req = RoleRequirement::authenticated().allow_unverified();
        assert!(req.allows_unverified());
        assert!(!req.is_public());
        assert!(req.is_any_authenticated());
    }

    #[test]
    fn test_requirement_error_display() {
        assert!(RequirementError::Empty.to_string().contains("no role"));

        let err = RequirementError::Misconfigured {
            operation: "post.update",
            detail: "missing team scope".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("post.update"));
        assert!(msg.contains("missing team scope"));
    }
}
