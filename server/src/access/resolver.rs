//! Context resolution.
//!
//! Turns the scope identifiers present on a request into a resolved
//! [`RequestContext`] plus the scope entities themselves. All scope
//! context is resolved up front in one pass so the decision engine can
//! evaluate cross-scope rules against a consistent snapshot instead of
//! racing independent per-scope checks.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, Organization, Post, Team};

use super::context::{ActorContext, RequestContext, SubjectContext};
use super::queries::{get_org_role, get_team_role};
use super::roles::PostRole;

/// Reference to an org or team: either its UUID or its slug.
#[derive(Debug, Clone)]
pub enum ScopeRef {
    /// Referenced by primary key.
    Id(Uuid),
    /// Referenced by slug.
    Slug(String),
}

impl ScopeRef {
    /// Parse a path segment: UUIDs become ids, everything else a slug.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        segment
            .parse::<Uuid>()
            .map_or_else(|_| Self::Slug(segment.to_string()), Self::Id)
    }
}

/// Scope identifiers extracted from a request's path.
#[derive(Debug, Clone, Default)]
pub struct ScopeIds {
    /// Organization reference, if the route carries one.
    pub org: Option<ScopeRef>,
    /// Team reference, if the route carries one. Requires an org.
    pub team: Option<ScopeRef>,
    /// Post reference, if the route carries one. Slugs require an org.
    pub post: Option<ScopeRef>,
    /// Subject-user ID, for endpoints that act on another user.
    pub subject: Option<Uuid>,
}

impl ScopeIds {
    /// No scope (platform-level request).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Org-scoped request.
    #[must_use]
    pub fn org(org: ScopeRef) -> Self {
        Self {
            org: Some(org),
            ..Self::default()
        }
    }

    /// Add a team reference.
    #[must_use]
    pub fn with_team(mut self, team: ScopeRef) -> Self {
        self.team = Some(team);
        self
    }

    /// Add a post reference.
    #[must_use]
    pub fn with_post(mut self, post: ScopeRef) -> Self {
        self.post = Some(post);
        self
    }

    /// Add a subject-user ID.
    #[must_use]
    pub fn with_subject(mut self, subject: Uuid) -> Self {
        self.subject = Some(subject);
        self
    }
}

/// The acting user as the resolver needs it: identity plus the facts the
/// verification-deadline check consumes.
#[derive(Debug, Clone, Copy)]
pub struct ActorRef {
    /// The acting user's ID.
    pub user_id: Uuid,
    /// Whether their email address is verified.
    pub email_verified: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Scope entities resolved for this request, handed to the handler after
/// authorization so it does not refetch them.
#[derive(Debug, Clone, Default)]
pub struct ResolvedScope {
    /// The organization, if the request was org-scoped.
    pub org: Option<Organization>,
    /// The team, if the request was team-scoped (explicitly or through the
    /// post's own team).
    pub team: Option<Team>,
    /// The post, if the request was post-scoped.
    pub post: Option<Post>,
}

/// Output of context resolution: entities plus the decision snapshot.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Resolved scope entities.
    pub scope: ResolvedScope,
    /// The request context the decision engine evaluates.
    pub context: RequestContext,
}

/// Context resolution errors.
///
/// `NotFound` covers every missing scope entity; the guard maps it without
/// revealing which entity was missing. Infrastructure failures stay
/// distinct so they surface as server errors, never as access decisions.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// An org, team, post, or subject user on the request does not exist.
    #[error("Scope entity not found")]
    NotFound,

    /// The repository layer failed.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// Resolve the request's scope identifiers into a [`Resolved`] snapshot.
///
/// Entity resolution is ordered (a team slug is only meaningful inside its
/// org; a post's team defines the team scope when the route carries none),
/// but membership rows are fetched concurrently once the entities are
/// known. The engine only requires the aggregate result.
#[tracing::instrument(skip(pool, actor))]
pub async fn resolve_context(
    pool: &PgPool,
    ids: &ScopeIds,
    actor: Option<ActorRef>,
) -> Result<Resolved, ResolveError> {
    // Organization first: team and post resolution are scoped to it.
    let org = match &ids.org {
        Some(ScopeRef::Id(id)) => Some(db::find_org_by_id(pool, *id).await?.ok_or(ResolveError::NotFound)?),
        Some(ScopeRef::Slug(slug)) => {
            Some(db::find_org_by_slug(pool, slug).await?.ok_or(ResolveError::NotFound)?)
        }
        None => None,
    };

    let post = match &ids.post {
        Some(post_ref) => {
            let post = match post_ref {
                ScopeRef::Id(id) => db::find_post_by_id(pool, *id).await?,
                ScopeRef::Slug(slug) => {
                    let org = org.as_ref().ok_or(ResolveError::NotFound)?;
                    db::find_post_by_slug(pool, org.id, slug).await?
                }
            }
            .ok_or(ResolveError::NotFound)?;

            // A post reference outside the routed org is treated as absent.
            if let Some(org) = &org {
                if post.org_id != org.id {
                    return Err(ResolveError::NotFound);
                }
            }
            Some(post)
        }
        None => None,
    };

    // Explicit team reference, or the post's own team when the route
    // carries none. Either way the request becomes team-scoped.
    let team = match (&ids.team, &post) {
        (Some(team_ref), _) => {
            let team = match team_ref {
                ScopeRef::Id(id) => db::find_team_by_id(pool, *id).await?,
                ScopeRef::Slug(slug) => {
                    let org = org.as_ref().ok_or(ResolveError::NotFound)?;
                    db::find_team_by_slug(pool, org.id, slug).await?
                }
            }
            .ok_or(ResolveError::NotFound)?;

            if let Some(org) = &org {
                if team.org_id != org.id {
                    return Err(ResolveError::NotFound);
                }
            }
            Some(team)
        }
        (None, Some(post)) => match post.team_id {
            Some(team_id) => Some(
                db::find_team_by_id(pool, team_id)
                    .await?
                    .ok_or(ResolveError::NotFound)?,
            ),
            None => None,
        },
        (None, None) => None,
    };

    let team_scope_present = team.is_some();
    let org_id = org.as_ref().map(|o| o.id);
    let team_id = team.as_ref().map(|t| t.id);

    // Membership rows for actor and subject, fetched concurrently.
    let actor_ctx = match actor {
        Some(actor) => Some(resolve_actor(pool, actor, org_id, team_id, post.as_ref()).await?),
        None => None,
    };

    let subject_ctx = match ids.subject {
        Some(subject_id) => Some(resolve_subject(pool, subject_id, org_id, team_id).await?),
        None => None,
    };

    Ok(Resolved {
        scope: ResolvedScope { org, team, post },
        context: RequestContext {
            actor: actor_ctx,
            subject: subject_ctx,
            team_scope_present,
        },
    })
}

/// Resolve the actor's membership rows and derived post role.
async fn resolve_actor(
    pool: &PgPool,
    actor: ActorRef,
    org_id: Option<Uuid>,
    team_id: Option<Uuid>,
    post: Option<&Post>,
) -> Result<ActorContext, ResolveError> {
    let (org_role, team_role) = tokio::try_join!(
        fetch_org_role(pool, org_id, actor.user_id),
        fetch_team_role(pool, team_id, actor.user_id),
    )?;

    Ok(ActorContext {
        user_id: actor.user_id,
        org_role,
        team_role,
        post_role: post.and_then(|p| post_role_for(p, actor.user_id)),
        email_verified: actor.email_verified,
        account_age: Utc::now() - actor.created_at,
    })
}

/// Resolve the subject user's membership rows.
///
/// The subject must exist; acting on an unknown user is a `NotFound`, not
/// a silently-empty context.
async fn resolve_subject(
    pool: &PgPool,
    subject_id: Uuid,
    org_id: Option<Uuid>,
    team_id: Option<Uuid>,
) -> Result<SubjectContext, ResolveError> {
    let (user, org_role, team_role) = tokio::try_join!(
        db::find_user_by_id(pool, subject_id),
        fetch_org_role(pool, org_id, subject_id),
        fetch_team_role(pool, team_id, subject_id),
    )?;

    let user = user.ok_or(ResolveError::NotFound)?;

    Ok(SubjectContext {
        user_id: user.id,
        org_role,
        team_role,
    })
}

async fn fetch_org_role(
    pool: &PgPool,
    org_id: Option<Uuid>,
    user_id: Uuid,
) -> sqlx::Result<Option<super::roles::OrgRole>> {
    match org_id {
        Some(org_id) => get_org_role(pool, org_id, user_id).await,
        None => Ok(None),
    }
}

async fn fetch_team_role(
    pool: &PgPool,
    team_id: Option<Uuid>,
    user_id: Uuid,
) -> sqlx::Result<Option<super::roles::TeamRole>> {
    match team_id {
        Some(team_id) => get_team_role(pool, team_id, user_id).await,
        None => Ok(None),
    }
}

/// Derive a user's post role from the post row itself.
///
/// Creator wins if the user is both creator and maintainer.
#[must_use]
pub fn post_role_for(post: &Post, user_id: Uuid) -> Option<PostRole> {
    if post.created_by == user_id {
        Some(PostRole::Creator)
    } else if post.maintainer_id == Some(user_id) {
        Some(PostRole::Maintainer)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(created_by: Uuid, maintainer_id: Option<Uuid>) -> Post {
        Post {
            id: Uuid::now_v7(),
            org_id: Uuid::now_v7(),
            team_id: None,
            slug: "onboarding".into(),
            title: "Onboarding".into(),
            content: String::new(),
            created_by,
            maintainer_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_scope_ref_parses_uuid_as_id() {
        let id = Uuid::now_v7();
        assert!(matches!(ScopeRef::parse(&id.to_string()), ScopeRef::Id(parsed) if parsed == id));
        assert!(matches!(
            ScopeRef::parse("platform-eng"),
            ScopeRef::Slug(ref s) if s == "platform-eng"
        ));
    }

    #[test]
    fn test_post_role_for_creator() {
        let user = Uuid::now_v7();
        assert_eq!(post_role_for(&post(user, None), user), Some(PostRole::Creator));
    }

    #[test]
    fn test_post_role_for_maintainer() {
        let creator = Uuid::now_v7();
        let maintainer = Uuid::now_v7();
        assert_eq!(
            post_role_for(&post(creator, Some(maintainer)), maintainer),
            Some(PostRole::Maintainer)
        );
    }

    #[test]
    fn test_post_role_creator_wins_over_maintainer() {
        let user = Uuid::now_v7();
        assert_eq!(
            post_role_for(&post(user, Some(user)), user),
            Some(PostRole::Creator)
        );
    }

    #[test]
    fn test_post_role_none_for_bystander() {
        let creator = Uuid::now_v7();
        assert_eq!(post_role_for(&post(creator, None), Uuid::now_v7()), None);
    }

    #[test]
    fn test_scope_ids_builder() {
        let ids = ScopeIds::org(ScopeRef::parse("acme"))
            .with_team(ScopeRef::parse("platform"))
            .with_subject(Uuid::now_v7());

        assert!(ids.org.is_some());
        assert!(ids.team.is_some());
        assert!(ids.post.is_none());
        assert!(ids.subject.is_some());
    }
}
