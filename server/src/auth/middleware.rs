//! Authentication Middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::access::ActorRef;
use crate::api::AppState;
use crate::db::{find_user_by_id, User};

use super::error::AuthError;

/// Authenticated user injected into request extensions.
///
/// Minimal safe-to-expose user data plus the two facts the access engine's
/// verification-deadline check consumes (verified flag, account creation
/// time).
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// When the account was created.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        let email_verified = user.email_verified();
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            email: user.email,
            avatar_url: user.avatar_url,
            email_verified,
            created_at: user.created_at,
        }
    }
}

impl From<AuthUser> for kb_common::User {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            email: Some(user.email),
            avatar_url: user.avatar_url,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

impl From<&AuthUser> for ActorRef {
    fn from(user: &AuthUser) -> Self {
        Self {
            user_id: user.id,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

impl AuthUser {
    /// The actor reference handed to the access guard.
    #[must_use]
    pub fn actor(&self) -> ActorRef {
        self.into()
    }
}

/// Middleware to require authentication.
///
/// Extracts the Bearer token from the Authorization header, validates the
/// JWT, loads the user from the database, and injects [`AuthUser`] into
/// request extensions.
///
/// # Usage
///
/// Apply to routes that require authentication:
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, require_auth))
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = state.jwt_keys.verify_access(token)?;

    let user_id: Uuid = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

    // Fresh load per request: role and verification data must never be
    // stale relative to the request being decided.
    let user = find_user_by_id(&state.db, user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    request.extensions_mut().insert(AuthUser::from(user));

    Ok(next.run(request).await)
}

/// Extractor for the authenticated user in handlers.
///
/// Use this to get the current user in protected endpoints:
///
/// ```ignore
/// async fn protected_handler(auth_user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", auth_user.username)
/// }
/// ```
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
