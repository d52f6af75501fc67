//! Access decision engine.
//!
//! Combines authentication status, the email-verification deadline, and
//! requirement evaluation into a single Allow/Deny decision. The engine is
//! pure and synchronous: it runs over an already-resolved
//! [`RequestContext`] snapshot, performs no I/O, and is never retried.

use chrono::Duration;

use super::conditional;
use super::context::RequestContext;
use super::requirement::RoleRequirement;
use super::roles::Role;

/// Grace period during which an unverified account may still act.
pub const VERIFICATION_GRACE: Duration = Duration::days(7);

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request is authorized.
    Allow,
    /// The request is denied.
    Deny(DenyReason),
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No authenticated actor on the request.
    NotAuthenticated,
    /// Verification grace period exceeded without a verified email.
    EmailUnverified,
    /// Authenticated, but no requirement member is satisfied.
    Forbidden,
    /// The requirement could not be evaluated. Declarations are validated
    /// at startup, so this is unreachable in a correctly-booted server;
    /// it exists so an unvalidated requirement still fails closed.
    MisconfiguredRequirement,
}

impl DenyReason {
    /// Stable reason code for logging. Not echoed to clients verbatim.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::EmailUnverified => "email_unverified",
            Self::Forbidden => "forbidden",
            Self::MisconfiguredRequirement => "misconfigured_requirement",
        }
    }
}

/// Decide whether the context satisfies the requirement.
///
/// Ordered checks, terminal at the first determination:
/// 1. public requirement: allow, nothing else evaluated
/// 2. no actor: deny `NotAuthenticated`
/// 3. account older than [`VERIFICATION_GRACE`] with unverified email on a
///    non-exempt endpoint: deny `EmailUnverified`
/// 4. requirement members, OR-combined: org/team members admit ranks
///    greater than or equal to the declared role, post members require
///    equality, conditional members delegate to the rule evaluator
#[must_use]
pub fn decide(requirement: &RoleRequirement, ctx: &RequestContext) -> Decision {
    if requirement.is_public() {
        return Decision::Allow;
    }

    let Some(actor) = ctx.actor.as_ref() else {
        return Decision::Deny(DenyReason::NotAuthenticated);
    };

    if !requirement.allows_unverified()
        && !actor.email_verified
        && actor.account_age > VERIFICATION_GRACE
    {
        return Decision::Deny(DenyReason::EmailUnverified);
    }

    if requirement.is_any_authenticated() {
        return Decision::Allow;
    }

    if requirement.roles().is_empty() {
        // Unreachable after startup validation; fail closed regardless.
        return Decision::Deny(DenyReason::MisconfiguredRequirement);
    }

    if requirement.roles().iter().any(|role| satisfies(*role, ctx)) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}

/// Whether the actor satisfies a single requirement member.
fn satisfies(role: Role, ctx: &RequestContext) -> bool {
    match role {
        Role::Org(required) => ctx
            .actor_org_role()
            .is_some_and(|held| held.rank() >= required.rank()),
        Role::Team(required) => ctx
            .actor_team_role()
            .is_some_and(|held| held.rank() >= required.rank()),
        Role::Post(required) => ctx.actor_post_role() == Some(required),
        Role::Conditional(cond) => conditional::evaluate(cond, ctx),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::access::context::{ActorContext, SubjectContext};
    use crate::access::roles::{ConditionalRole, OrgRole, PostRole, TeamRole};

    fn member_ctx(org: Option<OrgRole>) -> RequestContext {
        RequestContext {
            actor: Some(ActorContext {
                user_id: Uuid::now_v7(),
                org_role: org,
                team_role: None,
                post_role: None,
                email_verified: true,
                account_age: Duration::days(30),
            }),
            subject: None,
            team_scope_present: false,
        }
    }

    fn require(roles: impl IntoIterator<Item = Role>) -> RoleRequirement {
        RoleRequirement::any(roles).unwrap()
    }

    #[test]
    fn test_public_allows_unauthenticated() {
        // Public short-circuits before the authentication check.
        let decision = decide(&RoleRequirement::public(), &RequestContext::anonymous());
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_unauthenticated_denied_on_any_non_public() {
        let req = require([Role::Org(OrgRole::Member)]);
        assert_eq!(
            decide(&req, &RequestContext::anonymous()),
            Decision::Deny(DenyReason::NotAuthenticated)
        );

        assert_eq!(
            decide(&RoleRequirement::authenticated(), &RequestContext::anonymous()),
            Decision::Deny(DenyReason::NotAuthenticated)
        );
    }

    #[test]
    fn test_declared_moderator_admits_moderator_and_owner_denies_member() {
        let req = require([Role::Org(OrgRole::Moderator)]);

        assert_eq!(decide(&req, &member_ctx(Some(OrgRole::Moderator))), Decision::Allow);
        assert_eq!(decide(&req, &member_ctx(Some(OrgRole::Owner))), Decision::Allow);
        assert_eq!(
            decide(&req, &member_ctx(Some(OrgRole::Member))),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn test_owner_requirement_scenarios() {
        let req = require([Role::Org(OrgRole::Owner)]);

        assert_eq!(
            decide(&req, &member_ctx(Some(OrgRole::Moderator))),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(decide(&req, &member_ctx(Some(OrgRole::Owner))), Decision::Allow);
    }

    #[test]
    fn test_non_member_denied_even_for_member_requirement() {
        let req = require([Role::Org(OrgRole::Member)]);
        assert_eq!(
            decide(&req, &member_ctx(None)),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn test_post_role_requires_equality_not_order() {
        let req = require([Role::Post(PostRole::Maintainer)]);

        let mut ctx = member_ctx(Some(OrgRole::Owner));
        ctx.actor.as_mut().unwrap().post_role = Some(PostRole::Creator);

        // Creator does not satisfy a maintainer requirement; there is no
        // ordering between post roles.
        assert_eq!(decide(&req, &ctx), Decision::Deny(DenyReason::Forbidden));

        ctx.actor.as_mut().unwrap().post_role = Some(PostRole::Maintainer);
        assert_eq!(decide(&req, &ctx), Decision::Allow);
    }

    #[test]
    fn test_or_semantics_across_universes() {
        // {TeamRole::Owner, PostRole::Creator}: a post creator with no team
        // role at all is allowed.
        let req = require([Role::Team(TeamRole::Owner), Role::Post(PostRole::Creator)]);

        let mut ctx = member_ctx(Some(OrgRole::Member));
        ctx.actor.as_mut().unwrap().post_role = Some(PostRole::Creator);
        ctx.team_scope_present = true;

        assert_eq!(decide(&req, &ctx), Decision::Allow);
    }

    #[test]
    fn test_unverified_past_grace_denied() {
        let req = require([Role::Org(OrgRole::Owner)]);

        let mut ctx = member_ctx(Some(OrgRole::Owner));
        {
            let actor = ctx.actor.as_mut().unwrap();
            actor.email_verified = false;
            actor.account_age = Duration::days(8);
        }

        // Role sufficiency is irrelevant; the verification deadline comes first.
        assert_eq!(decide(&req, &ctx), Decision::Deny(DenyReason::EmailUnverified));
    }

    #[test]
    fn test_unverified_within_grace_allowed() {
        let req = require([Role::Org(OrgRole::Member)]);

        let mut ctx = member_ctx(Some(OrgRole::Member));
        {
            let actor = ctx.actor.as_mut().unwrap();
            actor.email_verified = false;
            actor.account_age = Duration::days(6);
        }

        assert_eq!(decide(&req, &ctx), Decision::Allow);
    }

    #[test]
    fn test_grace_boundary_is_strict() {
        let req = RoleRequirement::authenticated();

        let mut ctx = member_ctx(None);
        {
            let actor = ctx.actor.as_mut().unwrap();
            actor.email_verified = false;
            actor.account_age = VERIFICATION_GRACE;
        }

        // Exactly at the deadline still passes; deny requires age > grace.
        assert_eq!(decide(&req, &ctx), Decision::Allow);

        ctx.actor.as_mut().unwrap().account_age = VERIFICATION_GRACE + Duration::seconds(1);
        assert_eq!(decide(&req, &ctx), Decision::Deny(DenyReason::EmailUnverified));
    }

    #[test]
    fn test_exempt_endpoint_allows_unverified_past_grace() {
        let req = require([Role::Org(OrgRole::Member)]).allow_unverified();

        let mut ctx = member_ctx(Some(OrgRole::Member));
        {
            let actor = ctx.actor.as_mut().unwrap();
            actor.email_verified = false;
            actor.account_age = Duration::days(365);
        }

        assert_eq!(decide(&req, &ctx), Decision::Allow);
    }

    #[test]
    fn test_conditional_member_delegates() {
        let req = require([Role::Conditional(ConditionalRole::OrgMemberIfNoTeam)]);

        // Teamless request, org member: grants.
        assert_eq!(decide(&req, &member_ctx(Some(OrgRole::Member))), Decision::Allow);

        // Same actor under a team scope: the conditional no longer applies.
        let mut ctx = member_ctx(Some(OrgRole::Member));
        ctx.team_scope_present = true;
        assert_eq!(decide(&req, &ctx), Decision::Deny(DenyReason::Forbidden));
    }

    #[test]
    fn test_gte_subject_denies_without_subject_membership() {
        let req = require([Role::Conditional(ConditionalRole::OrgRoleGteSubject)]);

        let mut ctx = member_ctx(Some(OrgRole::Owner));
        ctx.subject = Some(SubjectContext {
            user_id: Uuid::now_v7(),
            org_role: None,
            team_role: None,
        });

        assert_eq!(decide(&req, &ctx), Decision::Deny(DenyReason::Forbidden));
    }

    #[test]
    fn test_team_requirement_fails_closed_without_team_data() {
        // A team-role requirement evaluated against a context resolved with
        // no team scope denies; the check is never silently skipped.
        let req = require([Role::Team(TeamRole::Member)]);
        assert_eq!(
            decide(&req, &member_ctx(Some(OrgRole::Owner))),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn test_decision_is_idempotent() {
        let req = require([Role::Org(OrgRole::Moderator)]);
        let ctx = member_ctx(Some(OrgRole::Moderator));

        let first = decide(&req, &ctx);
        let second = decide(&req, &ctx);
        assert_eq!(first, second);
        assert_eq!(first, Decision::Allow);
    }

    #[test]
    fn test_deny_reason_codes_are_stable() {
        assert_eq!(DenyReason::NotAuthenticated.as_str(), "not_authenticated");
        assert_eq!(DenyReason::EmailUnverified.as_str(), "email_unverified");
        assert_eq!(DenyReason::Forbidden.as_str(), "forbidden");
        assert_eq!(
            DenyReason::MisconfiguredRequirement.as_str(),
            "misconfigured_requirement"
        );
    }
}
