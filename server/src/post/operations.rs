//! Declared access requirements for post operations.

use std::sync::LazyLock;

use crate::access::{
    ConditionalRole, Operation, OrgRole, PostRole, Role, RoleRequirement, ScopeShape, TeamRole,
};

pub static LIST: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "post.list",
    requirement: RoleRequirement::public(),
    scope: ScopeShape::org().with_team(),
});

pub static GET: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "post.get",
    requirement: RoleRequirement::public(),
    scope: ScopeShape::org().with_team().with_post(),
});

pub static CREATE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "post.create",
    // Team posts need a team membership; org-scoped posts degrade to plain
    // org-member access because no team narrows the resource.
    requirement: RoleRequirement::any([
        Role::Team(TeamRole::Member),
        Role::Conditional(ConditionalRole::OrgMemberIfNoTeam),
    ])
    .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team(),
});

pub static UPDATE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "post.update",
    requirement: RoleRequirement::any([
        Role::Post(PostRole::Creator),
        Role::Post(PostRole::Maintainer),
        Role::Team(TeamRole::Moderator),
        Role::Org(OrgRole::Moderator),
    ])
    .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team().with_post(),
});

pub static DELETE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "post.delete",
    requirement: RoleRequirement::any([
        Role::Post(PostRole::Creator),
        Role::Team(TeamRole::Owner),
        Role::Org(OrgRole::Owner),
    ])
    .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team().with_post(),
});

pub static SET_MAINTAINER: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "post.set_maintainer",
    requirement: RoleRequirement::any([
        Role::Post(PostRole::Creator),
        Role::Team(TeamRole::Moderator),
        Role::Org(OrgRole::Moderator),
    ])
    .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team().with_post().with_subject(),
});

/// Every declared post operation, for startup validation.
pub fn all() -> Vec<&'static Operation> {
    vec![&LIST, &GET, &CREATE, &UPDATE, &DELETE, &SET_MAINTAINER]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::validate_operations;

    #[test]
    fn test_all_post_operations_validate() {
        validate_operations(all()).expect("post operation declarations must be valid");
    }
}
