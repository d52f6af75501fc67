//! End-to-end tests for the access-control engine: requirement + resolved
//! context in, decision out. No database required; contexts are built the
//! way the resolver builds them.

use chrono::Duration;
use uuid::Uuid;

use kb_server::access::{
    decide, validate_operations, ActorContext, ConditionalRole, Decision, DenyReason, Operation,
    OrgRole, PostRole, RequestContext, RequirementError, Role, RoleRequirement, ScopeShape,
    SubjectContext, TeamRole, VERIFICATION_GRACE,
};

fn verified_actor() -> ActorContext {
    ActorContext {
        user_id: Uuid::now_v7(),
        org_role: None,
        team_role: None,
        post_role: None,
        email_verified: true,
        account_age: Duration::days(90),
    }
}

fn ctx(actor: ActorContext) -> RequestContext {
    RequestContext {
        actor: Some(actor),
        subject: None,
        team_scope_present: false,
    }
}

#[test]
fn public_endpoint_allows_anonymous_actor() {
    let requirement = RoleRequirement::public();
    assert_eq!(
        decide(&requirement, &RequestContext::anonymous()),
        Decision::Allow
    );
}

#[test]
fn protected_endpoint_rejects_anonymous_actor() {
    let requirement = RoleRequirement::any([Role::Org(OrgRole::Member)]).unwrap();
    assert_eq!(
        decide(&requirement, &RequestContext::anonymous()),
        Decision::Deny(DenyReason::NotAuthenticated)
    );
}

#[test]
fn moderator_requirement_admits_owner_via_rank_order() {
    let requirement = RoleRequirement::any([Role::Org(OrgRole::Moderator)]).unwrap();

    let mut actor = verified_actor();
    actor.org_role = Some(OrgRole::Owner);
    assert_eq!(decide(&requirement, &ctx(actor)), Decision::Allow);

    let mut actor = verified_actor();
    actor.org_role = Some(OrgRole::Member);
    assert_eq!(
        decide(&requirement, &ctx(actor)),
        Decision::Deny(DenyReason::Forbidden)
    );
}

#[test]
fn or_semantics_grant_through_any_universe() {
    // {TeamRole::Owner, PostRole::Creator}: the post's creator passes with
    // no team role at all.
    let requirement =
        RoleRequirement::any([Role::Team(TeamRole::Owner), Role::Post(PostRole::Creator)])
            .unwrap();

    let mut actor = verified_actor();
    actor.post_role = Some(PostRole::Creator);
    let mut context = ctx(actor);
    context.team_scope_present = true;

    assert_eq!(decide(&requirement, &context), Decision::Allow);
}

#[test]
fn rank_conditional_compares_within_one_universe_only() {
    let requirement =
        RoleRequirement::any([Role::Conditional(ConditionalRole::TeamRoleGteSubject)]).unwrap();

    // Actor has a high org rank but no team rank; the team-universe
    // comparison must not fall back to the org rank.
    let mut actor = verified_actor();
    actor.org_role = Some(OrgRole::Owner);

    let mut context = ctx(actor);
    context.team_scope_present = true;
    context.subject = Some(SubjectContext {
        user_id: Uuid::now_v7(),
        org_role: Some(OrgRole::Member),
        team_role: Some(TeamRole::Member),
    });

    assert_eq!(
        decide(&requirement, &context),
        Decision::Deny(DenyReason::Forbidden)
    );
}

#[test]
fn gte_subject_denies_against_missing_subject_rank() {
    let requirement =
        RoleRequirement::any([Role::Conditional(ConditionalRole::OrgRoleGteSubject)]).unwrap();

    let mut actor = verified_actor();
    actor.org_role = Some(OrgRole::Owner);

    let mut context = ctx(actor);
    context.subject = Some(SubjectContext {
        user_id: Uuid::now_v7(),
        org_role: None,
        team_role: None,
    });

    assert_eq!(
        decide(&requirement, &context),
        Decision::Deny(DenyReason::Forbidden)
    );
}

#[test]
fn org_member_if_no_team_flips_with_team_scope() {
    let requirement =
        RoleRequirement::any([Role::Conditional(ConditionalRole::OrgMemberIfNoTeam)]).unwrap();

    let mut actor = verified_actor();
    actor.org_role = Some(OrgRole::Member);

    let mut context = ctx(actor);
    assert_eq!(decide(&requirement, &context), Decision::Allow);

    context.team_scope_present = true;
    assert_eq!(
        decide(&requirement, &context),
        Decision::Deny(DenyReason::Forbidden)
    );
}

#[test]
fn verification_deadline_applies_before_role_checks() {
    let requirement = RoleRequirement::any([Role::Org(OrgRole::Owner)]).unwrap();

    let mut actor = verified_actor();
    actor.org_role = Some(OrgRole::Owner);
    actor.email_verified = false;
    actor.account_age = VERIFICATION_GRACE + Duration::days(1);

    assert_eq!(
        decide(&requirement, &ctx(actor)),
        Decision::Deny(DenyReason::EmailUnverified)
    );
}

#[test]
fn exempt_requirement_waives_verification_deadline() {
    let requirement = RoleRequirement::any([Role::Org(OrgRole::Owner)])
        .unwrap()
        .allow_unverified();

    let mut actor = verified_actor();
    actor.org_role = Some(OrgRole::Owner);
    actor.email_verified = false;
    actor.account_age = Duration::days(365);

    assert_eq!(decide(&requirement, &ctx(actor)), Decision::Allow);
}

#[test]
fn same_inputs_same_decision() {
    let requirement = RoleRequirement::any([
        Role::Org(OrgRole::Moderator),
        Role::Conditional(ConditionalRole::OrgMemberIfNoTeam),
    ])
    .unwrap();

    let mut actor = verified_actor();
    actor.org_role = Some(OrgRole::Member);
    let context = ctx(actor);

    let decisions: Vec<Decision> = (0..3).map(|_| decide(&requirement, &context)).collect();
    assert!(decisions.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn startup_validation_rejects_unevaluable_declarations() {
    // Team requirement on an endpoint whose routes never carry a team.
    let op = Operation {
        name: "bad.team_on_org_endpoint",
        requirement: RoleRequirement::any([Role::Team(TeamRole::Moderator)]).unwrap(),
        scope: ScopeShape::org(),
    };
    assert!(matches!(
        validate_operations([&op]),
        Err(RequirementError::Misconfigured { .. })
    ));

    // Subject conditional without a subject-bearing route.
    let op = Operation {
        name: "bad.subjectless_comparison",
        requirement: RoleRequirement::any([Role::Conditional(ConditionalRole::OrgRoleGteSubject)])
            .unwrap(),
        scope: ScopeShape::org(),
    };
    assert!(validate_operations([&op]).is_err());
}

#[test]
fn empty_requirement_is_unrepresentable() {
    assert!(matches!(
        RoleRequirement::any([]),
        Err(RequirementError::Empty)
    ));
}
