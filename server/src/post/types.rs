//! Post Type Definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Maximum post content size in bytes (256KB of markdown).
pub const MAX_CONTENT_SIZE: usize = 262_144;

/// Custom deserializer for `Option<Option<T>>` that distinguishes three JSON states:
/// - field absent → `None`
/// - field present with `null` → `Some(None)`
/// - field present with value → `Some(Some(value))`
///
/// Required because serde's default behavior treats both absent and `null` as `None`.
#[allow(clippy::option_option)]
fn deserialize_double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    // If this function is called, the field was present in the JSON
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a post.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreatePostRequest {
    /// Post title (required).
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// URL-friendly slug (auto-generated from title if not provided).
    pub slug: Option<String>,
    /// Markdown content (required).
    pub content: String,
    /// Team to file the post under. Omit for an org-scoped post.
    pub team_id: Option<Uuid>,
}

/// Request body for updating a post.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdatePostRequest {
    /// New title (optional).
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    /// New content (optional).
    pub content: Option<String>,
}

/// Request body for assigning or clearing the post maintainer.
///
/// `{"user_id": null}` clears the maintainer; omitting the field is
/// rejected so the intent is always explicit.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetMaintainerRequest {
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub user_id: Option<Option<Uuid>>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Full post data including content.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub org_id: Uuid,
    pub team_id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub created_by: Uuid,
    pub maintainer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::db::Post> for PostResponse {
    fn from(post: crate::db::Post) -> Self {
        Self {
            id: post.id,
            org_id: post.org_id,
            team_id: post.team_id,
            slug: post.slug,
            title: post.title,
            content: post.content,
            created_by: post.created_by,
            maintainer_id: post.maintainer_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Post metadata for listing (content replaced by a plain-text excerpt).
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PostListItem {
    pub id: Uuid,
    pub org_id: Uuid,
    pub team_id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub created_by: Uuid,
    pub updated_at: DateTime<Utc>,
}
