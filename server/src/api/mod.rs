//! API Router and Application State
//!
//! Central routing configuration and shared state. Every declared access
//! requirement is validated here before the router is handed to the
//! listener; a bad declaration aborts startup instead of serving traffic.

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::access::{validate_operations, RequirementError};
use crate::auth::{self, require_auth, JwtKeys};
use crate::config::Config;
use crate::email::EmailService;
use crate::{org, post, team};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
    /// JWT signing/verification keys
    pub jwt_keys: JwtKeys,
    /// Email service (optional; verification mail disabled without it)
    pub email: Option<EmailService>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Fails if the configured JWT key material is invalid.
    pub fn new(db: PgPool, config: Config, email: Option<EmailService>) -> anyhow::Result<Self> {
        let jwt_keys = JwtKeys::from_pem(&config.jwt_private_key, &config.jwt_public_key)
            .map_err(|e| anyhow::anyhow!("JWT key setup failed: {e}"))?;

        Ok(Self {
            db,
            config: Arc::new(config),
            jwt_keys,
            email,
        })
    }

    /// Check if SMTP email delivery is available.
    #[must_use]
    pub const fn has_email(&self) -> bool {
        self.email.is_some()
    }
}

/// Validate every declared access requirement against its scope shape.
///
/// Run at startup, before the server binds. A failure here is a code
/// defect (an unevaluable requirement) and must never reach traffic.
pub fn validate_access_declarations() -> Result<(), RequirementError> {
    validate_operations(
        org::operations::all()
            .into_iter()
            .chain(team::operations::all())
            .chain(post::operations::all()),
    )
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public and protected routes merge per prefix; only the protected
    // side carries the auth middleware.
    let org_routes = org::public_router().merge(
        org::router().layer(from_fn_with_state(state.clone(), require_auth)),
    );
    let team_routes = team::router().layer(from_fn_with_state(state.clone(), require_auth));
    let post_routes = post::public_router().merge(
        post::router().layer(from_fn_with_state(state.clone(), require_auth)),
    );

    // TODO: Setup utoipa swagger-ui
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth::router(state.clone()))
        .nest("/api/orgs", org_routes)
        .nest("/api/orgs/{org}/teams", team_routes)
        .nest("/api/orgs/{org}/posts", post_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_operation_is_valid() {
        validate_access_declarations().expect("all declared operations must validate");
    }
}
