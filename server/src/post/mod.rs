//! Post Management Module
//!
//! Posts are markdown documents scoped to an organization, optionally
//! filed under one of its teams. Reading is public; writing goes through
//! the access guard with per-operation requirements.

pub mod handlers;
pub mod markdown;
pub mod operations;
pub mod queries;
pub mod types;

use axum::routing::{get, patch, put};
use axum::Router;

use crate::api::AppState;

/// Protected post routes (auth required; mounted at /api/orgs/{org}/posts).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(handlers::create_post))
        .route(
            "/{post}",
            patch(handlers::update_post).delete(handlers::delete_post),
        )
        .route("/{post}/maintainer", put(handlers::set_maintainer))
}

/// Public post routes (no auth; merged alongside the protected router).
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_posts))
        .route("/{post}", get(handlers::get_post))
}
