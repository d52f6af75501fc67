//! Post management handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

use crate::access::{authorize, AccessError, ScopeIds, ScopeRef};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::util::{slugify, validate_slug};

use super::markdown::render_excerpt;
use super::operations;
use super::queries;
use super::types::{
    CreatePostRequest, PostListItem, PostResponse, SetMaintainerRequest, UpdatePostRequest,
    MAX_CONTENT_SIZE,
};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Slug already in use")]
    SlugTaken,

    #[error("Maintainer must be an organization member")]
    MaintainerNotOrgMember,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match self {
            // Access failures carry their own response mapping.
            Self::Access(e) => return e.into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            Self::SlugTaken => (StatusCode::CONFLICT, "slug_taken"),
            Self::MaintainerNotOrgMember => (StatusCode::CONFLICT, "not_org_member"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
        };

        let body = serde_json::json!({"error": code, "message": message});
        (status, Json(body)).into_response()
    }
}

/// Query parameters for post listing.
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    /// Filter by team (id or slug).
    pub team: Option<String>,
}

fn check_content_size(content: &str) -> Result<(), PostError> {
    if content.len() > MAX_CONTENT_SIZE {
        return Err(PostError::Validation(format!(
            "Content must be at most {MAX_CONTENT_SIZE} bytes"
        )));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// List an organization's posts, optionally filtered by team.
#[utoipa::path(
    get,
    path = "/api/orgs/{org}/posts",
    tag = "posts",
    params(
        ("org" = String, Path, description = "Organization id or slug"),
        ("team" = Option<String>, Query, description = "Filter by team id or slug"),
    ),
    responses(
        (status = 200, description = "Posts in the organization", body = [PostListItem]),
    ),
)]
#[tracing::instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Path(org_ref): Path<String>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<PostListItem>>, PostError> {
    let mut ids = ScopeIds::org(ScopeRef::parse(&org_ref));
    if let Some(team) = &query.team {
        ids = ids.with_team(ScopeRef::parse(team));
    }

    let resolved = authorize(&state.db, &operations::LIST, ids, None).await?;

    let org = resolved.scope.org.ok_or(PostError::NotFound)?;
    let team_id = resolved.scope.team.map(|t| t.id);
    let posts = queries::list_posts(&state.db, org.id, team_id).await?;

    let items = posts
        .into_iter()
        .map(|post| PostListItem {
            id: post.id,
            org_id: post.org_id,
            team_id: post.team_id,
            slug: post.slug,
            title: post.title,
            excerpt: render_excerpt(&post.content),
            created_by: post.created_by,
            updated_at: post.updated_at,
        })
        .collect();

    Ok(Json(items))
}

/// Get a post by id or slug.
#[utoipa::path(
    get,
    path = "/api/orgs/{org}/posts/{post}",
    tag = "posts",
    params(
        ("org" = String, Path, description = "Organization id or slug"),
        ("post" = String, Path, description = "Post id or slug"),
    ),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "Post not found"),
    ),
)]
#[tracing::instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path((org_ref, post_ref)): Path<(String, String)>,
) -> Result<Json<PostResponse>, PostError> {
    let resolved = authorize(
        &state.db,
        &operations::GET,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_post(ScopeRef::parse(&post_ref)),
        None,
    )
    .await?;

    let post = resolved.scope.post.ok_or(PostError::NotFound)?;
    Ok(Json(post.into()))
}

/// Create a post, org-scoped or filed under a team.
#[utoipa::path(
    post,
    path = "/api/orgs/{org}/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_ref): Path<String>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), PostError> {
    let mut ids = ScopeIds::org(ScopeRef::parse(&org_ref));
    if let Some(team_id) = body.team_id {
        ids = ids.with_team(ScopeRef::Id(team_id));
    }

    let resolved = authorize(&state.db, &operations::CREATE, ids, Some(user.actor())).await?;

    body.validate()
        .map_err(|e| PostError::Validation(e.to_string()))?;
    check_content_size(&body.content)?;

    let slug = body.slug.clone().unwrap_or_else(|| slugify(&body.title));
    validate_slug(&slug).map_err(PostError::Validation)?;

    let org = resolved.scope.org.ok_or(PostError::NotFound)?;
    let team_id = resolved.scope.team.map(|t| t.id);

    let post = queries::create_post(
        &state.db,
        org.id,
        team_id,
        &slug,
        &body.title,
        &body.content,
        user.id,
    )
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => PostError::SlugTaken,
        _ => PostError::Database(e),
    })?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// Update a post's title or content.
#[utoipa::path(
    patch,
    path = "/api/orgs/{org}/posts/{post}",
    tag = "posts",
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, post_ref)): Path<(String, String)>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, PostError> {
    let resolved = authorize(
        &state.db,
        &operations::UPDATE,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_post(ScopeRef::parse(&post_ref)),
        Some(user.actor()),
    )
    .await?;

    body.validate()
        .map_err(|e| PostError::Validation(e.to_string()))?;
    if let Some(content) = &body.content {
        check_content_size(content)?;
    }

    let post = resolved.scope.post.ok_or(PostError::NotFound)?;
    let post = queries::update_post(
        &state.db,
        post.id,
        body.title.as_deref(),
        body.content.as_deref(),
    )
    .await?
    .ok_or(PostError::NotFound)?;

    Ok(Json(post.into()))
}

/// Soft-delete a post.
#[utoipa::path(
    delete,
    path = "/api/orgs/{org}/posts/{post}",
    tag = "posts",
    responses(
        (status = 204, description = "Post deleted"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, post_ref)): Path<(String, String)>,
) -> Result<StatusCode, PostError> {
    let resolved = authorize(
        &state.db,
        &operations::DELETE,
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_post(ScopeRef::parse(&post_ref)),
        Some(user.actor()),
    )
    .await?;

    let post = resolved.scope.post.ok_or(PostError::NotFound)?;
    if !queries::delete_post(&state.db, post.id).await? {
        return Err(PostError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Assign or clear the post's maintainer.
///
/// A post has at most one maintainer; the maintainer must be a member of
/// the post's organization.
#[utoipa::path(
    put,
    path = "/api/orgs/{org}/posts/{post}/maintainer",
    tag = "posts",
    request_body = SetMaintainerRequest,
    responses(
        (status = 200, description = "Maintainer updated", body = PostResponse),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn set_maintainer(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_ref, post_ref)): Path<(String, String)>,
    Json(body): Json<SetMaintainerRequest>,
) -> Result<Json<PostResponse>, PostError> {
    let maintainer_id = body
        .user_id
        .ok_or_else(|| PostError::Validation("user_id field is required".into()))?;

    let mut ids =
        ScopeIds::org(ScopeRef::parse(&org_ref)).with_post(ScopeRef::parse(&post_ref));
    if let Some(subject_id) = maintainer_id {
        ids = ids.with_subject(subject_id);
    }

    let resolved = authorize(
        &state.db,
        &operations::SET_MAINTAINER,
        ids,
        Some(user.actor()),
    )
    .await?;

    if maintainer_id.is_some() {
        let subject_is_org_member = resolved
            .context
            .subject
            .as_ref()
            .is_some_and(|s| s.org_role.is_some());
        if !subject_is_org_member {
            return Err(PostError::MaintainerNotOrgMember);
        }
    }

    let post = resolved.scope.post.ok_or(PostError::NotFound)?;
    let post = queries::set_maintainer(&state.db, post.id, maintainer_id)
        .await?
        .ok_or(PostError::NotFound)?;

    Ok(Json(post.into()))
}
