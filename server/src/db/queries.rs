//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! All query functions include error context logging to aid debugging.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{EmailVerification, Organization, Post, Session, Team, User};

/// Log and return a database error with context.
///
/// This helper ensures all database errors are logged with relevant context
/// before being propagated, making production debugging easier.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            tracing::error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

pub(crate) use db_error;

// ============================================================================
// User Queries
// ============================================================================

/// Find user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_id", user_id = %id))
}

/// Find user by username.
pub async fn find_user_by_username(pool: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_username", username = %username))
}

/// Find user by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_email", email = %email))
}

/// Check if username or email is already taken.
pub async fn identity_exists(pool: &PgPool, username: &str, email: &str) -> sqlx::Result<bool> {
    let result: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(db_error!("identity_exists", username = %username))?;

    Ok(result.0)
}

/// Create a new user.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    display_name: &str,
    email: &str,
    password_hash: &str,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r"
        INSERT INTO users (id, username, display_name, email, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(Uuid::now_v7())
    .bind(username)
    .bind(display_name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_user", username = %username))
}

/// Mark a user's email as verified.
///
/// Returns `false` if the user was already verified or does not exist.
pub async fn mark_email_verified(pool: &PgPool, user_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET email_verified_at = NOW(), updated_at = NOW()
         WHERE id = $1 AND email_verified_at IS NULL",
    )
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(db_error!("mark_email_verified", user_id = %user_id))?;

    Ok(result.rows_affected() > 0)
}

/// Update a user's profile fields.
pub async fn update_user_profile(
    pool: &PgPool,
    user_id: Uuid,
    display_name: Option<&str>,
    avatar_url: Option<&str>,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r"
        UPDATE users
        SET display_name = COALESCE($2, display_name),
            avatar_url = COALESCE($3, avatar_url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(user_id)
    .bind(display_name)
    .bind(avatar_url)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_user_profile", user_id = %user_id))
}

// ============================================================================
// Organization / Team / Post Lookups
// ============================================================================

/// Find organization by ID.
pub async fn find_org_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Organization>> {
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_org_by_id", org_id = %id))
}

/// Find organization by slug.
pub async fn find_org_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<Organization>> {
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_org_by_slug", slug = %slug))
}

/// Find team by ID.
pub async fn find_team_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Team>> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_team_by_id", team_id = %id))
}

/// Find team by slug within an organization.
pub async fn find_team_by_slug(
    pool: &PgPool,
    org_id: Uuid,
    slug: &str,
) -> sqlx::Result<Option<Team>> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE org_id = $1 AND slug = $2")
        .bind(org_id)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_team_by_slug", org_id = %org_id, slug = %slug))
}

/// Find a live (non-deleted) post by ID.
pub async fn find_post_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_post_by_id", post_id = %id))
}

/// Find a live post by slug within an organization.
pub async fn find_post_by_slug(
    pool: &PgPool,
    org_id: Uuid,
    slug: &str,
) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE org_id = $1 AND slug = $2 AND deleted_at IS NULL",
    )
    .bind(org_id)
    .bind(slug)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_post_by_slug", org_id = %org_id, slug = %slug))
}

// ============================================================================
// Session Queries
// ============================================================================

/// Create a session for refresh token tracking.
pub async fn create_session(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
) -> sqlx::Result<Session> {
    sqlx::query_as::<_, Session>(
        r"
        INSERT INTO sessions (id, user_id, token_hash, expires_at, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(id)
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .bind(ip_address)
    .bind(user_agent)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_session", user_id = %user_id))
}

/// Find a non-expired session by refresh token hash.
pub async fn find_session_by_token_hash(
    pool: &PgPool,
    token_hash: &str,
) -> sqlx::Result<Option<Session>> {
    sqlx::query_as::<_, Session>(
        "SELECT * FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

/// Delete a session by ID (logout).
pub async fn delete_session(pool: &PgPool, session_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_session", session_id = %session_id))?;

    Ok(())
}

/// Delete all sessions for a user.
pub async fn delete_all_user_sessions(pool: &PgPool, user_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_all_user_sessions", user_id = %user_id))?;

    Ok(result.rows_affected())
}

/// Remove expired sessions. Returns the number deleted.
pub async fn cleanup_expired_sessions(pool: &PgPool) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// ============================================================================
// Email Verification Queries
// ============================================================================

/// Store a pending email verification token (hashed).
pub async fn create_email_verification(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> sqlx::Result<EmailVerification> {
    sqlx::query_as::<_, EmailVerification>(
        r"
        INSERT INTO email_verifications (token_hash, user_id, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE
        SET token_hash = EXCLUDED.token_hash,
            expires_at = EXCLUDED.expires_at,
            created_at = NOW()
        RETURNING *
        ",
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_email_verification", user_id = %user_id))
}

/// Consume a verification token: deletes it and returns the row if it was
/// valid and unexpired.
pub async fn consume_email_verification(
    pool: &PgPool,
    token_hash: &str,
) -> sqlx::Result<Option<EmailVerification>> {
    sqlx::query_as::<_, EmailVerification>(
        r"
        DELETE FROM email_verifications
        WHERE token_hash = $1 AND expires_at > NOW()
        RETURNING *
        ",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}
