//! Role taxonomy: the four closed role universes.
//!
//! `OrgRole` and `TeamRole` are separate types on purpose. Both order
//! `Member < Moderator < Owner`, but a rank is only meaningful inside its
//! own universe; keeping the universes as distinct enums makes an
//! org-vs-team rank comparison a compile error instead of a latent bug.

use serde::{Deserialize, Serialize};

/// Role held by a user within an organization.
///
/// Ordered: `Member < Moderator < Owner`. A user holds at most one role
/// per organization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "org_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    /// Regular organization member.
    Member,
    /// Can manage members and teams.
    Moderator,
    /// Full control of the organization.
    Owner,
}

impl OrgRole {
    /// Ordinal rank, strictly increasing along `Member < Moderator < Owner`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Member => 0,
            Self::Moderator => 1,
            Self::Owner => 2,
        }
    }

    /// Stable name used in API payloads and audit logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Owner => "owner",
        }
    }

    /// All variants in ascending rank order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Member, Self::Moderator, Self::Owner]
    }
}

/// Role held by a user within a team.
///
/// Ordered: `Member < Moderator < Owner`. A team role may only be held by
/// a user who also holds some [`OrgRole`] in the owning organization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Regular team member.
    Member,
    /// Can manage team membership.
    Moderator,
    /// Full control of the team.
    Owner,
}

impl TeamRole {
    /// Ordinal rank, strictly increasing along `Member < Moderator < Owner`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Member => 0,
            Self::Moderator => 1,
            Self::Owner => 2,
        }
    }

    /// Stable name used in API payloads and audit logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Owner => "owner",
        }
    }

    /// All variants in ascending rank order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Member, Self::Moderator, Self::Owner]
    }
}

/// Role a user holds on a single post.
///
/// Not ordered: creator and maintainer are different relationships, not
/// ranks. Derived per request from `posts.created_by` and
/// `posts.maintainer_id`; never stored as its own row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostRole {
    /// Authored the post. Exactly one per post, immutable after creation.
    Creator,
    /// Designated maintainer. At most one per post, mutable.
    Maintainer,
}

impl PostRole {
    /// Stable name used in API payloads and audit logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Maintainer => "maintainer",
        }
    }

    /// All variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Creator, Self::Maintainer]
    }
}

/// Situational roles computed per request, never stored.
///
/// These are opaque tags at this layer; their meaning is resolved by the
/// conditional rule evaluator against the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalRole {
    /// Grants if the request has no team scope and the actor holds at
    /// least `OrgRole::Member`.
    OrgMemberIfNoTeam,
    /// Grants if the actor's org rank is >= the subject user's org rank.
    OrgRoleGteSubject,
    /// Grants if the actor's team rank is >= the subject user's team rank.
    TeamRoleGteSubject,
}

impl ConditionalRole {
    /// Stable name used in declarations and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrgMemberIfNoTeam => "org_member_if_no_team",
            Self::OrgRoleGteSubject => "org_role_gte_subject",
            Self::TeamRoleGteSubject => "team_role_gte_subject",
        }
    }

    /// All variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::OrgMemberIfNoTeam,
            Self::OrgRoleGteSubject,
            Self::TeamRoleGteSubject,
        ]
    }
}

/// A single member of a [`RoleRequirement`](super::RoleRequirement) set,
/// drawn from any of the four universes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Satisfied by an org rank >= the declared role.
    Org(OrgRole),
    /// Satisfied by a team rank >= the declared role.
    Team(TeamRole),
    /// Satisfied by exact post-role equality.
    Post(PostRole),
    /// Satisfied when the conditional rule evaluates true.
    Conditional(ConditionalRole),
}

impl Role {
    /// Stable name for declarations and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Org(r) => r.as_str(),
            Self::Team(r) => r.as_str(),
            Self::Post(r) => r.as_str(),
            Self::Conditional(r) => r.as_str(),
        }
    }
}

impl From<OrgRole> for Role {
    fn from(role: OrgRole) -> Self {
        Self::Org(role)
    }
}

impl From<TeamRole> for Role {
    fn from(role: TeamRole) -> Self {
        Self::Team(role)
    }
}

impl From<PostRole> for Role {
    fn from(role: PostRole) -> Self {
        Self::Post(role)
    }
}

impl From<ConditionalRole> for Role {
    fn from(role: ConditionalRole) -> Self {
        Self::Conditional(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_rank_strictly_increasing() {
        assert!(OrgRole::Member.rank() < OrgRole::Moderator.rank());
        assert!(OrgRole::Moderator.rank() < OrgRole::Owner.rank());
    }

    #[test]
    fn test_team_rank_strictly_increasing() {
        assert!(TeamRole::Member.rank() < TeamRole::Moderator.rank());
        assert!(TeamRole::Moderator.rank() < TeamRole::Owner.rank());
    }

    #[test]
    fn test_org_ord_agrees_with_rank() {
        // rank(a) >= rank(b) iff a occurs at or after b in declaration order
        for (i, a) in OrgRole::all().iter().enumerate() {
            for (j, b) in OrgRole::all().iter().enumerate() {
                assert_eq!(a.rank() >= b.rank(), i >= j, "{a:?} vs {b:?}");
                assert_eq!(*a >= *b, a.rank() >= b.rank(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_team_ord_agrees_with_rank() {
        for (i, a) in TeamRole::all().iter().enumerate() {
            for (j, b) in TeamRole::all().iter().enumerate() {
                assert_eq!(a.rank() >= b.rank(), i >= j, "{a:?} vs {b:?}");
                assert_eq!(*a >= *b, a.rank() >= b.rank(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_post_role_equality_only() {
        assert_eq!(PostRole::Creator, PostRole::Creator);
        assert_ne!(PostRole::Creator, PostRole::Maintainer);
    }

    #[test]
    fn test_names_are_snake_case() {
        let mut names: Vec<&str> = Vec::new();
        names.extend(OrgRole::all().iter().map(|r| r.as_str()));
        names.extend(PostRole::all().iter().map(|r| r.as_str()));
        names.extend(ConditionalRole::all().iter().map(|r| r.as_str()));

        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "name '{name}' should be snake_case"
            );
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&OrgRole::Moderator).unwrap();
        assert_eq!(json, "\"moderator\"");

        let restored: OrgRole = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(restored, OrgRole::Owner);

        let json = serde_json::to_string(&ConditionalRole::OrgMemberIfNoTeam).unwrap();
        assert_eq!(json, "\"org_member_if_no_team\"");
    }

    #[test]
    fn test_role_union_from_impls() {
        assert_eq!(Role::from(OrgRole::Owner), Role::Org(OrgRole::Owner));
        assert_eq!(Role::from(TeamRole::Member), Role::Team(TeamRole::Member));
        assert_eq!(Role::from(PostRole::Creator), Role::Post(PostRole::Creator));
        assert_eq!(
            Role::from(ConditionalRole::TeamRoleGteSubject),
            Role::Conditional(ConditionalRole::TeamRoleGteSubject)
        );
    }
}
