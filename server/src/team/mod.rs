//! Team Management Module
//!
//! Teams live inside an organization; a team role is always held on top
//! of an org role. Role checks go through the access guard.

pub mod handlers;
pub mod operations;
pub mod queries;
pub mod types;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::api::AppState;

/// Team routes (auth required; mounted at /api/orgs/{org}/teams).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_teams).post(handlers::create_team))
        .route(
            "/{team}",
            get(handlers::get_team)
                .patch(handlers::update_team)
                .delete(handlers::delete_team),
        )
        .route("/{team}/leave", post(handlers::leave_team))
        .route(
            "/{team}/members",
            get(handlers::list_members).post(handlers::add_member),
        )
        .route(
            "/{team}/members/{user_id}",
            patch(handlers::update_member_role).delete(handlers::remove_member),
        )
}
