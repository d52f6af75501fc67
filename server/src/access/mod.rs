//! Access-control engine.
//!
//! Decides, for every request, whether the acting user may perform the
//! requested action given the three-level scope hierarchy
//! (organization → team → post) and the role semantics attached to it.
//!
//! Layering, leaves first:
//! - `roles`: the four closed role universes and their orders
//! - `context`: the per-request resolved snapshot
//! - `conditional`: situational rule evaluation
//! - `requirement`: per-operation declarations, validated at startup
//! - `decision`: the pure Allow/Deny state machine
//! - `queries` + `resolver`: membership/entity resolution
//! - `guard`: the single pipeline stage handlers call

pub mod conditional;
pub mod context;
pub mod decision;
pub mod guard;
pub mod queries;
pub mod requirement;
pub mod resolver;
pub mod roles;

pub use context::{ActorContext, RequestContext, SubjectContext};
pub use decision::{decide, Decision, DenyReason, VERIFICATION_GRACE};
pub use guard::{authorize, AccessError};
pub use queries::{get_org_role, get_team_role};
pub use requirement::{
    validate_operations, Operation, RequirementError, RoleRequirement, ScopeShape,
};
pub use resolver::{
    post_role_for, resolve_context, ActorRef, Resolved, ResolveError, ScopeIds, ScopeRef,
};
pub use roles::{ConditionalRole, OrgRole, PostRole, Role, TeamRole};
