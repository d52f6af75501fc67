//! Authentication HTTP Handlers

use axum::extract::{Query, State};
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::error::{AuthError, AuthResult};
use super::hash_token;
use super::middleware::AuthUser;
use super::password::{hash_password, verify_password};
use crate::api::AppState;
use crate::db::{
    self, consume_email_verification, create_email_verification, create_session,
    delete_all_user_sessions, delete_session, find_session_by_token_hash, find_user_by_username,
    identity_exists, mark_email_verified, update_user_profile, User,
};

/// How long an emailed verification link stays valid.
const VERIFICATION_TOKEN_TTL_HOURS: i64 = 48;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Username (3-32 lowercase alphanumeric + underscore).
    #[validate(length(min = 3, max = 32), regex(path = *USERNAME_REGEX))]
    pub username: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Password (8-128 characters).
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Display name (optional, defaults to username).
    #[validate(length(max = 64))]
    pub display_name: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// Logout request.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LogoutRequest {
    /// Refresh token to invalidate.
    pub refresh_token: String,
    /// Also invalidate every other session for this user.
    #[serde(default)]
    pub all_sessions: bool,
}

/// Authentication response with tokens.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiry in seconds.
    pub expires_in: i64,
    /// Token type (always "Bearer").
    pub token_type: String,
}

/// Profile update request.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[validate(length(min = 1, max = 64))]
    pub display_name: Option<String>,
    /// New avatar URL.
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// Email verification confirmation query (`GET /auth/verify?token=...`).
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// Token from the emailed link.
    pub token: String,
}

// ============================================================================
// Regex for validation
// ============================================================================

/// Username validation regex (matches DB constraint).
static USERNAME_REGEX: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"^[a-z0-9_]{3,32}$").unwrap());

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract User-Agent from headers (sanitized and truncated for DB storage).
fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| {
            s.chars()
                .filter(|c| !c.is_control() || c.is_whitespace())
                .take(512)
                .collect()
        })
}

/// Issue a token pair and record the refresh session.
async fn issue_session(
    state: &AppState,
    user: &User,
    headers: &HeaderMap,
) -> AuthResult<AuthResponse> {
    let tokens = state.jwt_keys.issue_pair(
        user.id,
        state.config.jwt_access_expiry,
        state.config.jwt_refresh_expiry,
    )?;

    create_session(
        &state.db,
        tokens.refresh_token_id,
        user.id,
        &hash_token(&tokens.refresh_token),
        Utc::now() + Duration::seconds(state.config.jwt_refresh_expiry),
        None,
        extract_user_agent(headers).as_deref(),
    )
    .await?;

    Ok(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.access_expires_in,
        token_type: "Bearer".to_string(),
    })
}

/// Create a verification token for the user and send the link, if SMTP is
/// configured. Failures are logged, never fatal to the calling flow.
async fn send_verification_mail(state: &AppState, user_id: Uuid, email: &str) {
    let mut token_bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut token_bytes);
    let token = hex::encode(token_bytes);

    let stored = create_email_verification(
        &state.db,
        user_id,
        &hash_token(&token),
        Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS),
    )
    .await;

    if let Err(e) = stored {
        tracing::error!(error = %e, "Failed to store verification token");
        return;
    }

    let Some(mailer) = &state.email else {
        tracing::warn!("SMTP not configured; skipping verification email");
        return;
    };

    let link = format!("{}/api/auth/verify?token={token}", state.config.public_url);
    if let Err(e) = mailer.send_verification(email, &link).await {
        tracing::error!(error = %e, "Failed to send verification email");
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new user.
///
/// The new account starts unverified; a verification link is emailed and
/// the account may act normally during the verification grace period.
///
/// POST /auth/register
#[tracing::instrument(skip(state, headers, body), fields(username = %body.username))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    // UNIQUE constraints catch races; this check just gives a clean error.
    if identity_exists(&state.db, &body.username, &body.email).await? {
        return Err(AuthError::UserAlreadyExists);
    }

    let password_hash = hash_password(&body.password)?;
    let display_name = body.display_name.as_deref().unwrap_or(&body.username);

    let user = db::create_user(
        &state.db,
        &body.username,
        display_name,
        &body.email,
        &password_hash,
    )
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AuthError::UserAlreadyExists
        }
        _ => AuthError::Database(e),
    })?;

    send_verification_mail(&state, user.id, &user.email).await;

    let response = issue_session(&state, &user, &headers).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with username and password.
///
/// POST /auth/login
#[tracing::instrument(skip(state, headers, body), fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>> {
    let user = find_user_by_username(&state.db, &body.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let response = issue_session(&state, &user, &headers).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new token pair.
///
/// The old session is revoked and a new one recorded (rotation).
///
/// POST /auth/refresh
#[tracing::instrument(skip(state, headers, body))]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RefreshRequest>,
) -> AuthResult<Json<AuthResponse>> {
    state.jwt_keys.verify_refresh(&body.refresh_token)?;

    let session = find_session_by_token_hash(&state.db, &hash_token(&body.refresh_token))
        .await?
        .ok_or(AuthError::InvalidToken)?;

    let user = db::find_user_by_id(&state.db, session.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    delete_session(&state.db, session.id).await?;

    let response = issue_session(&state, &user, &headers).await?;
    Ok(Json(response))
}

/// Invalidate the presented refresh session.
///
/// POST /auth/logout
#[tracing::instrument(skip(state, auth_user, body))]
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<LogoutRequest>,
) -> AuthResult<StatusCode> {
    if body.all_sessions {
        delete_all_user_sessions(&state.db, auth_user.id).await?;
        return Ok(StatusCode::NO_CONTENT);
    }

    if let Some(session) =
        find_session_by_token_hash(&state.db, &hash_token(&body.refresh_token)).await?
    {
        // Only the session owner may revoke it.
        if session.user_id == auth_user.id {
            delete_session(&state.db, session.id).await?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Get the current user's profile.
///
/// GET /auth/me
pub async fn get_profile(auth_user: AuthUser) -> Json<kb_common::User> {
    Json(auth_user.into())
}

/// Update the current user's profile.
///
/// POST /auth/me
#[tracing::instrument(skip(state, auth_user, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> AuthResult<Json<kb_common::User>> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let user = update_user_profile(
        &state.db,
        auth_user.id,
        body.display_name.as_deref(),
        body.avatar_url.as_deref(),
    )
    .await?
    .ok_or(AuthError::UserNotFound)?;

    Ok(Json(kb_common::User::from(AuthUser::from(user))))
}

/// Re-send the verification link for the current user.
///
/// POST /auth/verify/send
#[tracing::instrument(skip(state, auth_user))]
pub async fn send_verification(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AuthResult<StatusCode> {
    if auth_user.email_verified {
        return Err(AuthError::AlreadyVerified);
    }

    send_verification_mail(&state, auth_user.id, &auth_user.email).await;
    Ok(StatusCode::ACCEPTED)
}

/// Confirm an emailed verification token.
///
/// GET /auth/verify?token=...
#[tracing::instrument(skip(state, query))]
pub async fn confirm_verification(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> AuthResult<StatusCode> {
    let verification = consume_email_verification(&state.db, &hash_token(&query.token))
        .await?
        .ok_or(AuthError::InvalidVerificationToken)?;

    mark_email_verified(&state.db, verification.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
