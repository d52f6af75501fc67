//! Declared access requirements for organization operations.
//!
//! One static declaration per protected operation; all of them are
//! validated against their scope shapes at router construction.

use std::sync::LazyLock;

use crate::access::{ConditionalRole, Operation, OrgRole, Role, RoleRequirement, ScopeShape};

pub static CREATE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.create",
    requirement: RoleRequirement::authenticated(),
    scope: ScopeShape::none(),
});

pub static GET: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.get",
    requirement: RoleRequirement::public(),
    scope: ScopeShape::org(),
});

pub static UPDATE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.update",
    requirement: RoleRequirement::any([Role::Org(OrgRole::Moderator)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org(),
});

pub static DELETE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.delete",
    requirement: RoleRequirement::any([Role::Org(OrgRole::Owner)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org(),
});

pub static LIST_MEMBERS: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.members.list",
    requirement: RoleRequirement::any([Role::Org(OrgRole::Member)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org(),
});

pub static ADD_MEMBER: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.members.add",
    requirement: RoleRequirement::any([Role::Org(OrgRole::Moderator)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_subject(),
});

pub static UPDATE_MEMBER_ROLE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.members.update_role",
    requirement: RoleRequirement::any([Role::Conditional(ConditionalRole::OrgRoleGteSubject)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_subject(),
});

pub static REMOVE_MEMBER: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.members.remove",
    requirement: RoleRequirement::any([Role::Conditional(ConditionalRole::OrgRoleGteSubject)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org().with_subject(),
});

pub static LEAVE: LazyLock<Operation> = LazyLock::new(|| Operation {
    name: "org.leave",
    requirement: RoleRequirement::any([Role::Org(OrgRole::Member)])
        .expect("non-empty requirement"),
    scope: ScopeShape::org(),
});

/// Every declared org operation, for startup validation.
pub fn all() -> Vec<&'static Operation> {
    vec![
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
    fn test_all_org_operations_validate() {
        validate_operations(all()).expect("org operation declarations must be valid");
    }
}
