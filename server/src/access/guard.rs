//! Guard pipeline.
//!
//! One entry point per protected request: resolve the whole scope snapshot,
//! run the decision engine once, map the outcome to a transport error.
//! There is no per-scope middleware chain; cross-scope conditional rules
//! see one consistent context.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use super::decision::{decide, Decision, DenyReason};
use super::requirement::Operation;
use super::resolver::{resolve_context, ActorRef, Resolved, ResolveError, ScopeIds};

/// Access failure as the transport layer sees it.
///
/// Deny reasons map to stable, non-revealing responses. For protected
/// endpoints a missing scope entity produces the same body as a role
/// failure, so existence never leaks to unauthorized actors; only public
/// endpoints surface a real 404.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No valid credential on the request.
    #[error("Authentication required")]
    NotAuthenticated,

    /// Verification grace period exceeded.
    #[error("Email verification required")]
    EmailUnverified,

    /// Authenticated but not authorized.
    #[error("Access forbidden")]
    Forbidden,

    /// Entity missing on a public endpoint.
    #[error("Not found")]
    NotFound,

    /// Requirement could not be evaluated (startup validation bypassed).
    #[error("Access control misconfigured")]
    Misconfigured,

    /// Repository failure.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::NotAuthenticated => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
            Self::EmailUnverified => (StatusCode::FORBIDDEN, "EMAIL_UNVERIFIED"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Misconfigured | Self::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(serde_json::json!({
            "error": code,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Authorize one operation against the request's scope.
///
/// Sequence: resolve the full `RequestContext` (entities + membership rows
/// + verification facts), run the decision engine, return the resolved
/// scope to the handler on `Allow`. Fails closed on every missing input.
pub async fn authorize(
    pool: &PgPool,
    operation: &Operation,
    ids: ScopeIds,
    actor: Option<ActorRef>,
) -> Result<Resolved, AccessError> {
    let resolved = match resolve_context(pool, &ids, actor).await {
        Ok(resolved) => resolved,
        Err(ResolveError::NotFound) => {
            debug!(operation = operation.name, "scope entity not found");
            // Public endpoints may reveal absence; protected ones must not.
            return Err(if operation.requirement.is_public() {
                AccessError::NotFound
            } else {
                AccessError::Forbidden
            });
        }
        Err(ResolveError::Database(e)) => return Err(AccessError::Database(e)),
    };

    match decide(&operation.requirement, &resolved.context) {
        Decision::Allow => Ok(resolved),
        Decision::Deny(reason) => {
            debug!(
                operation = operation.name,
                reason = reason.as_str(),
                "access denied"
            );
            Err(match reason {
                DenyReason::NotAuthenticated => AccessError::NotAuthenticated,
                DenyReason::EmailUnverified => AccessError::EmailUnverified,
                DenyReason::Forbidden => AccessError::Forbidden,
                DenyReason::MisconfiguredRequirement => AccessError::Misconfigured,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AccessError::NotAuthenticated, StatusCode::UNAUTHORIZED),
            (AccessError::EmailUnverified, StatusCode::FORBIDDEN),
            (AccessError::Forbidden, StatusCode::FORBIDDEN),
            (AccessError::NotFound, StatusCode::NOT_FOUND),
            (AccessError::Misconfigured, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_error_messages_do_not_reveal_reason_detail() {
        // The body carries a stable code, not which entity was missing or
        // which role member failed.
        assert_eq!(AccessError::Forbidden.to_string(), "Access forbidden");
        assert_eq!(AccessError::NotFound.to_string(), "Not found");
    }
}
