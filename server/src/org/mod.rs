//! Organization Management Module
//!
//! Handles organization creation, settings, and membership. All role
//! checks go through the access guard; handlers carry only domain
//! invariants (slug uniqueness, last-owner protection).

pub mod handlers;
pub mod operations;
pub mod queries;
pub mod types;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::api::AppState;

/// Protected org routes (auth required; mounted at /api/orgs).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_org))
        .route(
            "/{org}",
            patch(handlers::update_org).delete(handlers::delete_org),
        )
        .route("/{org}/leave", post(handlers::leave_org))
        .route(
            "/{org}/members",
            get(handlers::list_members).post(handlers::add_member),
        )
        .route(
            "/{org}/members/{user_id}",
            patch(handlers::update_member_role).delete(handlers::remove_member),
        )
}

/// Public org routes (no auth; merged alongside the protected router).
pub fn public_router() -> Router<AppState> {
    Router::new().route("/{org}", get(handlers::get_org))
}
