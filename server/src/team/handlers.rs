//! Team management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::access::{authorize, AccessError, ScopeIds, ScopeRef, TeamRole};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::util::{slugify, validate_slug};

use super::operations;
use super::queries;
use super::types::{
    AddTeamMemberRequest, CreateTeamRequest, TeamMemberResponse, TeamResponse, UpdateTeamRequest,
    UpdateTeamMemberRoleRequest,
};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum TeamError {
    #[error("Team not found")]
    NotFound,

    #[error("Slug already in use")]
    SlugTaken,

    #[error("User is already a member")]
    AlreadyMember,

    #[error("User must be an organization member first")]
    NotOrgMember,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for TeamError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match self {
            // Access failures carry their own response mapping.
            Self::Access(e) => return e.into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            Self::SlugTaken => (StatusCode::CONFLICT, "slug_taken"),
            Self::AlreadyMember => (StatusCode::CONFLICT, "already_member"),
            Self::NotOrgMember => (StatusCode::CONFLICT, "not_org_member"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
        };

        let body = serde_json::json!({"error": code, "message": message});
        (status, Json(body)).into_response()
    }
}

fn team_response(team: crate::db::Team, member_count: i64) -> TeamResponse {
    TeamResponse {
        id: team.id,
        org_id: team.org_id,
        slug: team.slug,
        name: team.name,
        description: team.description,
        member_count,
        created_at: team.created_at,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List the organization's teams.
///
/// GET /api/orgs/{org}/teams
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_teams(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_ref): Path<String>,
) -> Result<Json<Vec<TeamResponse>>, TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::LIST,
        ScopeIds::org(ScopeRef::parse(&org_ref)),
        Some(user.actor()),
    )
    .await?;

    let org = resolved.scope.org.ok_or(TeamError::NotFound)?;
    let teams = queries::list_teams(&state.db, org.id).await?;

    let mut out = Vec::with_capacity(teams.len());
    for team in teams {
        let member_count = queries::count_members(&state.db, team.id).await?;
        out.push(team_response(team, member_count));
    }

    Ok(Json(out))
}

/// Create a team; the caller becomes its first team owner.
///
/// POST /api/orgs/{org}/teams
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_team(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_ref): Path<String>,
    Json(body): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::CREATE,
        ScopeIds::org(ScopeRef::parse(&org_ref)),
        Some(user.actor()),
    )
    .await?;

    body.validate()
        .map_err(|e| TeamError::Validation(e.to_string()))?;

    let slug = body.slug.clone().unwrap_or_else(|| slugify(&body.name));
    validate_slug(&slug).map_err(TeamError::Validation)?;

    let org = resolved.scope.org.ok_or(TeamError::NotFound)?;
    let team = queries::create_team(
        &state.db,
        org.id,
        &slug,
        &body.name,
        body.description.as_deref(),
        user.id,
    )
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => TeamError::SlugTaken,
        _ => TeamError::Database(e),
    })?;

    Ok((StatusCode::CREATED, Json(team_response(team, 1))))
}

/// Get a team by id or slug.
///
/// GET /api/orgs/{org}/teams/{team}
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_team(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, team_ref)): Path<(String, String)>,
) -> Result<Json<TeamResponse>, TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::GET,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_team(ScopeRef::parse(&team_ref)),
        Some(user.actor()),
    )
    .await?;

    let team = resolved.scope.team.ok_or(TeamError::NotFound)?;
    let member_count = queries::count_members(&state.db, team.id).await?;

    Ok(Json(team_response(team, member_count)))
}

/// Update a team's name or description.
///
/// PATCH /api/orgs/{org}/teams/{team}
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_team(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, team_ref)): Path<(String, String)>,
    Json(body): Json<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::UPDATE,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_team(ScopeRef::parse(&team_ref)),
        Some(user.actor()),
    )
    .await?;

    body.validate()
        .map_err(|e| TeamError::Validation(e.to_string()))?;

    let team = resolved.scope.team.ok_or(TeamError::NotFound)?;
    let team = queries::update_team(
        &state.db,
        team.id,
        body.name.as_deref(),
        body.description.as_deref(),
    )
    .await?
    .ok_or(TeamError::NotFound)?;
    let member_count = queries::count_members(&state.db, team.id).await?;

    Ok(Json(team_response(team, member_count)))
}

/// Delete a team.
///
/// DELETE /api/orgs/{org}/teams/{team}
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_team(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, team_ref)): Path<(String, String)>,
) -> Result<StatusCode, TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::DELETE,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_team(ScopeRef::parse(&team_ref)),
        Some(user.actor()),
    )
    .await?;

    let team = resolved.scope.team.ok_or(TeamError::NotFound)?;
    queries::delete_team(&state.db, team.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List a team's members.
///
/// GET /api/orgs/{org}/teams/{team}/members
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, team_ref)): Path<(String, String)>,
) -> Result<Json<Vec<TeamMemberResponse>>, TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::LIST_MEMBERS,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_team(ScopeRef::parse(&team_ref)),
        Some(user.actor()),
    )
    .await?;

    let team = resolved.scope.team.ok_or(TeamError::NotFound)?;
    let members = queries::list_members(&state.db, team.id).await?;

    Ok(Json(members))
}

/// Add an org member to the team (as a plain member).
///
/// POST /api/orgs/{org}/teams/{team}/members
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn add_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, team_ref)): Path<(String, String)>,
    Json(body): Json<AddTeamMemberRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::ADD_MEMBER,
        ScopeIds::org(ScopeRef::parse(&org_ref))
            .with_team(ScopeRef::parse(&team_ref))
            .with_subject(body.user_id),
        Some(user.actor()),
    )
    .await?;

    // A team role may only be held on top of an org role.
    let subject_is_org_member = resolved
        .context
        .subject
        .as_ref()
        .is_some_and(|s| s.org_role.is_some());
    if !subject_is_org_member {
        return Err(TeamError::NotOrgMember);
    }

    let team = resolved.scope.team.ok_or(TeamError::NotFound)?;
    let member = queries::add_member(&state.db, team.id, body.user_id, TeamRole::Member)
        .await?
        .ok_or(TeamError::AlreadyMember)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "team_id": member.team_id,
            "user_id": member.user_id,
            "role": member.role,
            "joined_at": member.joined_at,
        })),
    ))
}

/// Change a team member's role.
///
/// Requires outranking (or equalling) the target's current team rank.
///
/// PATCH /api/orgs/{org}/teams/{team}/members/{user_id}
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_member_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, team_ref, subject_id)): Path<(String, String, Uuid)>,
    Json(body): Json<UpdateTeamMemberRoleRequest>,
) -> Result<Json<serde_json::Value>, TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::UPDATE_MEMBER_ROLE,
        ScopeIds::org(ScopeRef::parse(&org_ref))
            .with_team(ScopeRef::parse(&team_ref))
            .with_subject(subject_id),
        Some(user.actor()),
    )
    .await?;

    let team = resolved.scope.team.ok_or(TeamError::NotFound)?;
    let member = queries::update_member_role(&state.db, team.id, subject_id, body.role)
        .await?
        .ok_or(TeamError::NotFound)?;

    Ok(Json(serde_json::json!({
        "team_id": member.team_id,
        "user_id": member.user_id,
        "role": member.role,
    })))
}

/// Remove a member from the team.
///
/// DELETE /api/orgs/{org}/teams/{team}/members/{user_id}
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, team_ref, subject_id)): Path<(String, String, Uuid)>,
) -> Result<StatusCode, TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::REMOVE_MEMBER,
        ScopeIds::org(ScopeRef::parse(&org_ref))
            .with_team(ScopeRef::parse(&team_ref))
            .with_subject(subject_id),
        Some(user.actor()),
    )
    .await?;

    let team = resolved.scope.team.ok_or(TeamError::NotFound)?;
    if !queries::remove_member(&state.db, team.id, subject_id).await? {
        return Err(TeamError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Leave the team.
///
/// POST /api/orgs/{org}/teams/{team}/leave
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn leave_team(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, team_ref)): Path<(String, String)>,
) -> Result<StatusCode, TeamError> {
    let resolved = authorize(
        &state.db,
        &operations::LEAVE,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_team(ScopeRef::parse(&team_ref)),
        Some(user.actor()),
    )
    .await?;

    let team = resolved.scope.team.ok_or(TeamError::NotFound)?;
    queries::remove_member(&state.db, team.id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
