//! Database queries for the access-control engine.
//!
//! Membership rows are fetched fresh for every request; the engine never
//! caches role data across requests.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::db_error;

use super::roles::{OrgRole, TeamRole};

/// Fetch a user's role in an organization, if they are a member.
pub async fn get_org_role(
    pool: &PgPool,
    org_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<Option<OrgRole>> {
    let row: Option<(OrgRole,)> = sqlx::query_as(
        "SELECT role FROM org_members WHERE org_id = $1 AND user_id = $2",
    )
    .bind(org_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("get_org_role", org_id = %org_id, user_id = %user_id))?;

    Ok(row.map(|(role,)| role))
}

/// Fetch a user's role in a team, if they are a member.
pub async fn get_team_role(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<Option<TeamRole>> {
    let row: Option<(TeamRole,)> = sqlx::query_as(
        "SELECT role FROM team_members WHERE team_id = $1 AND user_id = $2",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("get_team_role", team_id = %team_id, user_id = %user_id))?;

    Ok(row.map(|(role,)| role))
}
