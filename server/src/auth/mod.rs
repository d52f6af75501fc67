//! Authentication Service
//!
//! Local username/password authentication, JWT session management, and
//! email verification. Produces the authenticated actor the access-control
//! engine consumes; it performs no authorization itself.

mod error;
mod handlers;
pub mod jwt;
mod middleware;
mod password;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sha2::{Digest, Sha256};

use crate::api::AppState;

pub use error::{AuthError, AuthResult};
pub use jwt::JwtKeys;
pub use middleware::{require_auth, AuthUser};

/// SHA256-hex a refresh or verification token for at-rest storage.
///
/// Tokens are stored hashed so a database leak does not leak usable
/// credentials.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create authentication router.
///
/// Public routes (no auth required):
/// - POST /register - Register a new user
/// - POST /login - Login with username/password
/// - POST /refresh - Refresh access token
/// - GET /verify - Confirm an emailed verification token
///
/// Protected routes (auth required):
/// - POST /logout - Invalidate session
/// - GET /me - Get current user profile
/// - POST /me - Update profile
/// - POST /verify/send - Re-send the verification link
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh_token))
        .route("/verify", get(handlers::confirm_verification));

    let protected_routes = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::get_profile))
        .route("/me", post(handlers::update_profile))
        .route("/verify/send", post(handlers::send_verification))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_deterministic_sha256_hex() {
        let a = hash_token("token-one");
        let b = hash_token("token-one");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_differs_per_input() {
        assert_ne!(hash_token("token-one"), hash_token("token-two"));
    }
}
