//! Organization management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::access::{authorize, AccessError, OrgRole, ScopeIds, ScopeRef};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::util::{slugify, validate_slug};

use super::operations;
use super::queries;
use super::types::{
    AddOrgMemberRequest, CreateOrgRequest, OrgMemberResponse, OrgResponse, UpdateOrgRequest,
    UpdateOrgMemberRoleRequest,
};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum OrgError {
    #[error("Organization not found")]
    NotFound,

    #[error("Slug already in use")]
    SlugTaken,

    #[error("User is already a member")]
    AlreadyMember,

    #[error("An organization must keep at least one owner")]
    LastOwner,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for OrgError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match self {
            // Access failures carry their own response mapping.
            Self::Access(e) => return e.into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            Self::SlugTaken => (StatusCode::CONFLICT, "slug_taken"),
            Self::AlreadyMember => (StatusCode::CONFLICT, "already_member"),
            Self::LastOwner => (StatusCode::CONFLICT, "last_owner"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
        };

        let body = serde_json::json!({"error": code, "message": message});
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Create an organization; the caller becomes its first owner.
///
/// POST /api/orgs
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_org(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateOrgRequest>,
) -> Result<(StatusCode, Json<OrgResponse>), OrgError> {
    authorize(
        &state.db,
        &operations::CREATE,
        ScopeIds::none(),
        Some(user.actor()),
    )
    .await?;

    body.validate()
        .map_err(|e| OrgError::Validation(e.to_string()))?;

    let slug = body.slug.clone().unwrap_or_else(|| slugify(&body.name));
    validate_slug(&slug).map_err(OrgError::Validation)?;

    let org = queries::create_org(
        &state.db,
        &slug,
        &body.name,
        body.description.as_deref(),
        user.id,
    )
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => OrgError::SlugTaken,
        _ => OrgError::Database(e),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(OrgResponse {
            id: org.id,
            slug: org.slug,
            name: org.name,
            description: org.description,
            member_count: 1,
            created_at: org.created_at,
        }),
    ))
}

/// Get an organization by id or slug.
///
/// GET /api/orgs/{org}
#[tracing::instrument(skip(state))]
pub async fn get_org(
    State(state): State<AppState>,
    Path(org_ref): Path<String>,
) -> Result<Json<OrgResponse>, OrgError> {
    let resolved = authorize(
        &state.db,
        &operations::GET,
        ScopeIds::org(ScopeRef::parse(&org_ref)),
        None,
    )
    .await?;

    let org = resolved.scope.org.ok_or(OrgError::NotFound)?;
    let member_count = queries::count_members(&state.db, org.id).await?;

    Ok(Json(OrgResponse {
        id: org.id,
        slug: org.slug,
        name: org.name,
        description: org.description,
        member_count,
        created_at: org.created_at,
    }))
}

/// Update an organization's name or description.
///
/// PATCH /api/orgs/{org}
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_org(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_ref): Path<String>,
    Json(body): Json<UpdateOrgRequest>,
) -> Result<Json<OrgResponse>, OrgError> {
    let resolved = authorize(
        &state.db,
        &operations::UPDATE,
        ScopeIds::org(ScopeRef::parse(&org_ref)),
        Some(user.actor()),
    )
    .await?;

    body.validate()
        .map_err(|e| OrgError::Validation(e.to_string()))?;

    let org = resolved.scope.org.ok_or(OrgError::NotFound)?;
    let org = queries::update_org(&state.db, org.id, body.name.as_deref(), body.description.as_deref())
        .await?
        .ok_or(OrgError::NotFound)?;
    let member_count = queries::count_members(&state.db, org.id).await?;

    Ok(Json(OrgResponse {
        id: org.id,
        slug: org.slug,
        name: org.name,
        description: org.description,
        member_count,
        created_at: org.created_at,
    }))
}

/// Delete an organization.
///
/// DELETE /api/orgs/{org}
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_org(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_ref): Path<String>,
) -> Result<StatusCode, OrgError> {
    let resolved = authorize(
        &state.db,
        &operations::DELETE,
        ScopeIds::org(ScopeRef::parse(&org_ref)),
        Some(user.actor()),
    )
    .await?;

    let org = resolved.scope.org.ok_or(OrgError::NotFound)?;
    queries::delete_org(&state.db, org.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List an organization's members.
///
/// GET /api/orgs/{org}/members
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_ref): Path<String>,
) -> Result<Json<Vec<OrgMemberResponse>>, OrgError> {
    let resolved = authorize(
        &state.db,
        &operations::LIST_MEMBERS,
        ScopeIds::org(ScopeRef::parse(&org_ref)),
        Some(user.actor()),
    )
    .await?;

    let org = resolved.scope.org.ok_or(OrgError::NotFound)?;
    let members = queries::list_members(&state.db, org.id).await?;

    Ok(Json(members))
}

/// Add a user to the organization (as a plain member).
///
/// POST /api/orgs/{org}/members
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn add_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_ref): Path<String>,
    Json(body): Json<AddOrgMemberRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), OrgError> {
    let resolved = authorize(
        &state.db,
        &operations::ADD_MEMBER,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_subject(body.user_id),
        Some(user.actor()),
    )
    .await?;

    let org = resolved.scope.org.ok_or(OrgError::NotFound)?;
    let member = queries::add_member(&state.db, org.id, body.user_id, OrgRole::Member)
        .await?
        .ok_or(OrgError::AlreadyMember)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "org_id": member.org_id,
            "user_id": member.user_id,
            "role": member.role,
            "joined_at": member.joined_at,
        })),
    ))
}

/// Change a member's role.
///
/// Requires outranking (or equalling) the target's current rank; demoting
/// the last owner is rejected so the org never becomes ownerless.
///
/// PATCH /api/orgs/{org}/members/{user_id}
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_member_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, subject_id)): Path<(String, Uuid)>,
    Json(body): Json<UpdateOrgMemberRoleRequest>,
) -> Result<Json<serde_json::Value>, OrgError> {
    let resolved = authorize(
        &state.db,
        &operations::UPDATE_MEMBER_ROLE,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_subject(subject_id),
        Some(user.actor()),
    )
    .await?;

    let org = resolved.scope.org.ok_or(OrgError::NotFound)?;

    let subject_role = resolved.context.subject.as_ref().and_then(|s| s.org_role);
    if subject_role == Some(OrgRole::Owner)
        && body.role != OrgRole::Owner
        && queries::count_owners(&state.db, org.id).await? <= 1
    {
        return Err(OrgError::LastOwner);
    }

    let member = queries::update_member_role(&state.db, org.id, subject_id, body.role)
        .await?
        .ok_or(OrgError::NotFound)?;

    Ok(Json(serde_json::json!({
        "org_id": member.org_id,
        "user_id": member.user_id,
        "role": member.role,
    })))
}

/// Remove a member from the organization.
///
/// DELETE /api/orgs/{org}/members/{user_id}
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, subject_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, OrgError> {
    let resolved = authorize(
        &state.db,
        &operations::REMOVE_MEMBER,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_subject(subject_id),
        Some(user.actor()),
    )
    .await?;

    let org = resolved.scope.org.ok_or(OrgError::NotFound)?;

    let subject_role = resolved.context.subject.as_ref().and_then(|s| s.org_role);
    if subject_role == Some(OrgRole::Owner)
        && queries::count_owners(&state.db, org.id).await? <= 1
    {
        return Err(OrgError::LastOwner);
    }

    if !queries::remove_member(&state.db, org.id, subject_id).await? {
        return Err(OrgError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Leave the organization.
///
/// POST /api/orgs/{org}/leave
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn leave_org(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_ref): Path<String>,
) -> Result<StatusCode, OrgError> {
    let resolved = authorize(
        &state.db,
        &operations::LEAVE,
        ScopeIds::org(ScopeRef::parse(&org_ref)),
        Some(user.actor()),
    )
    .await?;

    let org = resolved.scope.org.ok_or(OrgError::NotFound)?;

    if resolved.context.actor_org_role() == Some(OrgRole::Owner)
        && queries::count_owners(&state.db, org.id).await? <= 1
    {
        return Err(OrgError::LastOwner);
    }

    queries::remove_member(&state.db, org.id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
