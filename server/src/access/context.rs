//! Request-scoped access context.
//!
//! A [`RequestContext`] is the resolved snapshot a single authorization
//! decision runs against. It is created at the start of guard evaluation
//! and discarded at its end; it is never cached or shared across requests.

use chrono::Duration;
use uuid::Uuid;

use super::roles::{OrgRole, PostRole, TeamRole};

/// Resolved facts about the acting user.
#[derive(Debug, Clone)]
pub struct ActorContext {
    /// The acting user's ID.
    pub user_id: Uuid,
    /// Org role in the request's organization scope, if a member.
    pub org_role: Option<OrgRole>,
    /// Team role in the request's team scope, if a member.
    pub team_role: Option<TeamRole>,
    /// Role on the request's post scope, if creator or maintainer.
    pub post_role: Option<PostRole>,
    /// Whether the actor's email address is verified.
    pub email_verified: bool,
    /// Age of the account at resolution time.
    pub account_age: Duration,
}

/// Resolved facts about the subject user (the user being acted upon),
/// populated only for endpoints that target another user.
#[derive(Debug, Clone)]
pub struct SubjectContext {
    /// The subject user's ID.
    pub user_id: Uuid,
    /// Subject's org role in the request's organization scope.
    pub org_role: Option<OrgRole>,
    /// Subject's team role in the request's team scope.
    pub team_role: Option<TeamRole>,
}

/// Per-request snapshot consumed by the decision engine.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated actor, if any.
    pub actor: Option<ActorContext>,
    /// The subject user, if the endpoint acts on another user.
    pub subject: Option<SubjectContext>,
    /// Whether the request carries a team scope. Distinct from the actor
    /// holding a team role: a team-scoped request by a non-member still
    /// sets this flag.
    pub team_scope_present: bool,
}

impl RequestContext {
    /// Context for an unauthenticated request with no resolved scope.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            actor: None,
            subject: None,
            team_scope_present: false,
        }
    }

    /// The actor's org rank, if the actor exists and is an org member.
    #[must_use]
    pub fn actor_org_role(&self) -> Option<OrgRole> {
        self.actor.as_ref().and_then(|a| a.org_role)
    }

    /// The actor's team rank, if the actor exists and is a team member.
    #[must_use]
    pub fn actor_team_role(&self) -> Option<TeamRole> {
        self.actor.as_ref().and_then(|a| a.team_role)
    }

    /// The actor's post role, if any.
    #[must_use]
    pub fn actor_post_role(&self) -> Option<PostRole> {
        self.actor.as_ref().and_then(|a| a.post_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_context_is_empty() {
        let ctx = RequestContext::anonymous();
        assert!(ctx.actor.is_none());
        assert!(ctx.subject.is_none());
        assert!(!ctx.team_scope_present);
        assert_eq!(ctx.actor_org_role(), None);
        assert_eq!(ctx.actor_team_role(), None);
        assert_eq!(ctx.actor_post_role(), None);
    }

    #[test]
    fn test_accessors_read_through_actor() {
        let ctx = RequestContext {
            actor: Some(ActorContext {
                user_id: Uuid::now_v7(),
                org_role: Some(OrgRole::Moderator),
                team_role: None,
                post_role: Some(PostRole::Creator),
                email_verified: true,
                account_age: Duration::days(30),
            }),
            subject: None,
            team_scope_present: true,
        };

        assert_eq!(ctx.actor_org_role(), Some(OrgRole::Moderator));
        assert_eq!(ctx.actor_team_role(), None);
        assert_eq!(ctx.actor_post_role(), Some(PostRole::Creator));
    }
}
