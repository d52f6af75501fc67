//! Organization Type Definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::access::OrgRole;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateOrgRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,
    /// URL-friendly slug (auto-generated from name if not provided).
    pub slug: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateOrgRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddOrgMemberRequest {
    /// User to add. New members always start as `member`; promotions go
    /// through the role update endpoint and its rank checks.
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrgMemberRoleRequest {
    pub role: OrgRole,
}

// ============================================================================
// Response Types
// ============================================================================

/// Org member with profile fields for list responses.
#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
pub struct OrgMemberResponse {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: OrgRole,
    pub joined_at: DateTime<Utc>,
}

/// Organization with the member count for list/detail responses.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct OrgResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}
