//! Conditional rule evaluation.
//!
//! Resolves the situational [`ConditionalRole`] variants against a
//! [`RequestContext`]. Missing data is never an error here: a context
//! without the facts a rule needs evaluates to `false` ("does not
//! qualify"). Genuine failures are raised upstream by the context
//! resolver before this code runs.

use super::context::RequestContext;
use super::roles::ConditionalRole;

/// Evaluate a conditional role against the resolved request context.
///
/// Rules:
/// - `OrgMemberIfNoTeam`: true iff the request carries no team scope and
///   the actor holds at least `OrgRole::Member`. When a team scope is
///   present, the team's own role checks govern instead.
/// - `OrgRoleGteSubject`: true iff both actor and subject have a resolved
///   org rank and the actor's rank is >= the subject's. A subject with no
///   org membership denies; there is no rank to compare against.
/// - `TeamRoleGteSubject`: same rule over team ranks.
#[must_use]
pub fn evaluate(role: ConditionalRole, ctx: &RequestContext) -> bool {
    match role {
        ConditionalRole::OrgMemberIfNoTeam => {
            !ctx.team_scope_present && ctx.actor_org_role().is_some()
        }
        ConditionalRole::OrgRoleGteSubject => {
            match (
                ctx.actor_org_role(),
                ctx.subject.as_ref().and_then(|s| s.org_role),
            ) {
                (Some(actor), Some(subject)) => actor.rank() >= subject.rank(),
                _ => false,
            }
        }
        ConditionalRole::TeamRoleGteSubject => {
            match (
                ctx.actor_team_role(),
                ctx.subject.as_ref().and_then(|s| s.team_role),
            ) {
                (Some(actor), Some(subject)) => actor.rank() >= subject.rank(),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::access::context::{ActorContext, SubjectContext};
    use crate::access::roles::{OrgRole, TeamRole};

    fn actor(org: Option<OrgRole>, team: Option<TeamRole>) -> ActorContext {
        ActorContext {
            user_id: Uuid::now_v7(),
            org_role: org,
            team_role: team,
            post_role: None,
            email_verified: true,
            account_age: Duration::days(1),
        }
    }

    fn subject(org: Option<OrgRole>, team: Option<TeamRole>) -> SubjectContext {
        SubjectContext {
            user_id: Uuid::now_v7(),
            org_role: org,
            team_role: team,
        }
    }

    #[test]
    fn test_org_member_if_no_team_grants_member_on_teamless_scope() {
        let ctx = RequestContext {
            actor: Some(actor(Some(OrgRole::Member), None)),
            subject: None,
            team_scope_present: false,
        };
        assert!(evaluate(ConditionalRole::OrgMemberIfNoTeam, &ctx));
    }

    #[test]
    fn test_org_member_if_no_team_denies_when_team_scope_present() {
        // Same actor, but the request carries a team scope: the team's own
        // role check governs instead.
        let ctx = RequestContext {
            actor: Some(actor(Some(OrgRole::Member), None)),
            subject: None,
            team_scope_present: true,
        };
        assert!(!evaluate(ConditionalRole::OrgMemberIfNoTeam, &ctx));
    }

    #[test]
    fn test_org_member_if_no_team_denies_non_member() {
        let ctx = RequestContext {
            actor: Some(actor(None, None)),
            subject: None,
            team_scope_present: false,
        };
        assert!(!evaluate(ConditionalRole::OrgMemberIfNoTeam, &ctx));
    }

    #[test]
    fn test_org_member_if_no_team_denies_anonymous() {
        assert!(!evaluate(
            ConditionalRole::OrgMemberIfNoTeam,
            &RequestContext::anonymous()
        ));
    }

    #[test]
    fn test_org_gte_subject_grants_equal_rank() {
        let ctx = RequestContext {
            actor: Some(actor(Some(OrgRole::Moderator), None)),
            subject: Some(subject(Some(OrgRole::Moderator), None)),
            team_scope_present: false,
        };
        assert!(evaluate(ConditionalRole::OrgRoleGteSubject, &ctx));
    }

    #[test]
    fn test_org_gte_subject_grants_higher_rank() {
        let ctx = RequestContext {
            actor: Some(actor(Some(OrgRole::Owner), None)),
            subject: Some(subject(Some(OrgRole::Member), None)),
            team_scope_present: false,
        };
        assert!(evaluate(ConditionalRole::OrgRoleGteSubject, &ctx));
    }

    #[test]
    fn test_org_gte_subject_denies_lower_rank() {
        let ctx = RequestContext {
            actor: Some(actor(Some(OrgRole::Member), None)),
            subject: Some(subject(Some(OrgRole::Owner), None)),
            team_scope_present: false,
        };
        assert!(!evaluate(ConditionalRole::OrgRoleGteSubject, &ctx));
    }

    #[test]
    fn test_org_gte_subject_denies_when_subject_has_no_org_role() {
        // Even an owner cannot compare against a non-existent rank.
        let ctx = RequestContext {
            actor: Some(actor(Some(OrgRole::Owner), None)),
            subject: Some(subject(None, None)),
            team_scope_present: false,
        };
        assert!(!evaluate(ConditionalRole::OrgRoleGteSubject, &ctx));
    }

    #[test]
    fn test_org_gte_subject_denies_when_no_subject_resolved() {
        let ctx = RequestContext {
            actor: Some(actor(Some(OrgRole::Owner), None)),
            subject: None,
            team_scope_present: false,
        };
        assert!(!evaluate(ConditionalRole::OrgRoleGteSubject, &ctx));
    }

    #[test]
    fn test_team_gte_subject_mirrors_org_rule() {
        let ctx = RequestContext {
            actor: Some(actor(None, Some(TeamRole::Moderator))),
            subject: Some(subject(None, Some(TeamRole::Member))),
            team_scope_present: true,
        };
        assert!(evaluate(ConditionalRole::TeamRoleGteSubject, &ctx));

        let ctx = RequestContext {
            actor: Some(actor(None, Some(TeamRole::Member))),
            subject: Some(subject(None, Some(TeamRole::Owner))),
            team_scope_present: true,
        };
        assert!(!evaluate(ConditionalRole::TeamRoleGteSubject, &ctx));
    }

    #[test]
    fn test_team_gte_subject_denies_when_either_side_lacks_rank() {
        let ctx = RequestContext {
            actor: Some(actor(Some(OrgRole::Owner), None)),
            subject: Some(subject(None, Some(TeamRole::Member))),
            team_scope_present: true,
        };
        assert!(!evaluate(ConditionalRole::TeamRoleGteSubject, &ctx));

        let ctx = RequestContext {
            actor: Some(actor(None, Some(TeamRole::Owner))),
            subject: Some(subject(Some(OrgRole::Member), None)),
            team_scope_present: true,
        };
        assert!(!evaluate(ConditionalRole::TeamRoleGteSubject, &ctx));
    }
}
