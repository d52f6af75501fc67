//! Database queries for teams and their memberships.

use sqlx::PgPool;
use uuid::Uuid;

use crate::access::TeamRole;
use crate::db::{db_error, Team, TeamMember};

use super::types::TeamMemberResponse;

/// Create a team; the creator becomes its first team owner.
pub async fn create_team(
    pool: &PgPool,
    org_id: Uuid,
    slug: &str,
    name: &str,
    description: Option<&str>,
    created_by: Uuid,
) -> sqlx::Result<Team> {
    let mut tx = pool.begin().await?;

    let team = sqlx::query_as::<_, Team>(
        r"
        INSERT INTO teams (id, org_id, slug, name, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(Uuid::now_v7())
    .bind(org_id)
    .bind(slug)
    .bind(name)
    .bind(description)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_error!("create_team", org_id = %org_id, slug = %slug))?;

    sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(team.id)
        .bind(created_by)
        .bind(TeamRole::Owner)
        .execute(&mut *tx)
        .await
        .map_err(db_error!("create_team_owner", team_id = %team.id))?;

    tx.commit().await?;
    Ok(team)
}

/// List an organization's teams.
pub async fn list_teams(pool: &PgPool, org_id: Uuid) -> sqlx::Result<Vec<Team>> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE org_id = $1 ORDER BY name ASC")
        .bind(org_id)
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_teams", org_id = %org_id))
}

/// Update a team's mutable fields.
pub async fn update_team(
    pool: &PgPool,
    team_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> sqlx::Result<Option<Team>> {
    sqlx::query_as::<_, Team>(
        r"
        UPDATE teams
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(team_id)
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_team", team_id = %team_id))
}

/// Delete a team. Memberships cascade; the org's posts that referenced the
/// team fall back to org scope.
pub async fn delete_team(pool: &PgPool, team_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(team_id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_team", team_id = %team_id))?;

    Ok(result.rows_affected() > 0)
}

/// Count a team's members.
pub async fn count_members(pool: &PgPool, team_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM team_members WHERE team_id = $1")
        .bind(team_id)
        .fetch_one(pool)
        .await
        .map_err(db_error!("count_team_members", team_id = %team_id))
}

/// List a team's members with profile fields.
pub async fn list_members(pool: &PgPool, team_id: Uuid) -> sqlx::Result<Vec<TeamMemberResponse>> {
    sqlx::query_as::<_, TeamMemberResponse>(
        r"
        SELECT m.user_id, u.username, u.display_name, u.avatar_url, m.role, m.joined_at
        FROM team_members m
        INNER JOIN users u ON u.id = m.user_id
        WHERE m.team_id = $1
        ORDER BY m.joined_at ASC
        ",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_team_members", team_id = %team_id))
}

/// Add a user to a team with the given role.
///
/// Returns `None` if the user is already a member.
pub async fn add_member(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    role: TeamRole,
) -> sqlx::Result<Option<TeamMember>> {
    sqlx::query_as::<_, TeamMember>(
        r"
        INSERT INTO team_members (team_id, user_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (team_id, user_id) DO NOTHING
        RETURNING *
        ",
    )
    .bind(team_id)
    .bind(user_id)
    .bind(role)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("add_team_member", team_id = %team_id, user_id = %user_id))
}

/// Change a team member's role.
pub async fn update_member_role(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    role: TeamRole,
) -> sqlx::Result<Option<TeamMember>> {
    sqlx::query_as::<_, TeamMember>(
        r"
        UPDATE team_members
        SET role = $3
        WHERE team_id = $1 AND user_id = $2
        RETURNING *
        ",
    )
    .bind(team_id)
    .bind(user_id)
    .bind(role)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_team_member_role", team_id = %team_id, user_id = %user_id))
}

/// Remove a member from a team.
pub async fn remove_member(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(db_error!("remove_team_member", team_id = %team_id, user_id = %user_id))?;

    Ok(result.rows_affected() > 0)
}
