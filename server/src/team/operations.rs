//! Declared access requirements for team operations.

use std::sync::LazyLock;

use crate::access::{
    ConditionalRole, Operation, OrgRole, Role, RoleRequirement, ScopeShape, TeamRole,
};

pub static LIST: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.list",
    requirement: RoleRequirement::any([Role::Org(OrgRole::Member)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org(),
});

pub static CREATE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.create",
    requirement: RoleRequirement::any([Role::Org(OrgRole::Moderator)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org(),
});

pub static GET: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.get",
    requirement: RoleRequirement::any([Role::Org(OrgRole::Member)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team(),
});

pub static UPDATE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.update",
    requirement: RoleRequirement::any([
        Role::Team(TeamRole::Moderator),
        Role::Org(OrgRole::Moderator),
    ])
    .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team(),
});

pub static DELETE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.delete",
    requirement: RoleRequirement::any([Role::Team(TeamRole::Owner), Role::Org(OrgRole::Owner)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team(),
});

pub static LIST_MEMBERS: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.members.list",
    requirement: RoleRequirement::any([
        Role::Team(TeamRole::Member),
        Role::Org(OrgRole::Moderator),
    ])
    .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team(),
});

pub static ADD_MEMBER: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.members.add",
    requirement: RoleRequirement::any([Role::Team(TeamRole::Moderator)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team().with_subject(),
});

pub static UPDATE_MEMBER_ROLE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.members.update_role",
    requirement: RoleRequirement::any([Role::Conditional(ConditionalRole::TeamRoleGteSubject)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team().with_subject(),
});

pub static REMOVE_MEMBER: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.members.remove",
    requirement: RoleRequirement::any([Role::Conditional(ConditionalRole::TeamRoleGteSubject)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team().with_subject(),
});

pub static LEAVE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "team.leave",
    requirement: RoleRequirement::any([Role::Team(TeamRole::Member)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_team(),
});

/// Every declared team operation, for startup validation.
pub fn all() -> Vec<&'static Operation> {
    vec![
        &LIST,
        &CREATE,
        &GET,
        &UPDATE,
        &DELETE,
        &LIST_MEMBERS,
        &ADD_MEMBER,
        &UPDATE_MEMBER_ROLE,
        &REMOVE_MEMBER,
        &LEAVE,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::validate_operations;

    #[test]
    fn test_all_team_operations_validate() {
        validate_operations(all()).expect("team operation declarations must be valid");
    }
}
