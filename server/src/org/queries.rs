//! Database queries for organizations and their memberships.

use sqlx::PgPool;
use uuid::Uuid;

use crate::access::OrgRole;
use crate::db::{db_error, Organization, OrgMember};

use super::types::OrgMemberResponse;

/// Create an organization; the creator becomes its first owner.
///
/// Single transaction so an org can never exist without an owner.
pub async fn create_org(
    pool: &PgPool,
    slug: &str,
    name: &str,
    description: Option<&str>,
    created_by: Uuid,
) -> sqlx::Result<Organization> {
    let mut tx = pool.begin().await?;

    let org = sqlx::query_as::<_, Organization>(
        r"
        INSERT INTO organizations (id, slug, name, description, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(Uuid::now_v7())
    .bind(slug)
    .bind(name)
    .bind(description)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_error!("create_org", slug = %slug))?;

    sqlx::query(
        "INSERT INTO org_members (org_id, user_id, role) VALUES ($1, $2, $3)",
    )
    .bind(org.id)
    .bind(created_by)
    .bind(OrgRole::Owner)
    .execute(&mut *tx)
    .await
    .map_err(db_error!("create_org_owner", org_id = %org.id))?;

    tx.commit().await?;
    Ok(org)
}

/// Update an organization's mutable fields.
pub async fn update_org(
    pool: &PgPool,
    org_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> sqlx::Result<Option<Organization>> {
    sqlx::query_as::<_, Organization>(
        r"
        UPDATE organizations
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(org_id)
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_org", org_id = %org_id))
}

/// Delete an organization. Memberships, teams, and posts cascade.
pub async fn delete_org(pool: &PgPool, org_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
        .bind(org_id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_org", org_id = %org_id))?;

    Ok(result.rows_affected() > 0)
}

/// Count an organization's members.
pub async fn count_members(pool: &PgPool, org_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM org_members WHERE org_id = $1")
        .bind(org_id)
        .fetch_one(pool)
        .await
        .map_err(db_error!("count_org_members", org_id = %org_id))
}

/// List an organization's members with profile fields.
pub async fn list_members(pool: &PgPool, org_id: Uuid) -> sqlx::Result<Vec<OrgMemberResponse>> {
    sqlx::query_as::<_, OrgMemberResponse>(
        r"
        SELECT m.user_id, u.username, u.display_name, u.avatar_url, m.role, m.joined_at
        FROM org_members m
        INNER JOIN users u ON u.id = m.user_id
        WHERE m.org_id = $1
        ORDER BY m.joined_at ASC
        ",
    )
    .bind(org_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_org_members", org_id = %org_id))
}

/// Add a user to an organization with the given role.
///
/// Returns `None` if the user is already a member.
pub async fn add_member(
    pool: &PgPool,
    org_id: Uuid,
    user_id: Uuid,
    role: OrgRole,
) -> sqlx::Result<Option<OrgMember>> {
    sqlx::query_as::<_, OrgMember>(
        r"
        INSERT INTO org_members (org_id, user_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (org_id, user_id) DO NOTHING
        RETURNING *
        ",
    )
    .bind(org_id)
    .bind(user_id)
    .bind(role)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("add_org_member", org_id = %org_id, user_id = %user_id))
}

/// Change a member's role.
pub async fn update_member_role(
    pool: &PgPool,
    org_id: Uuid,
    user_id: Uuid,
    role: OrgRole,
) -> sqlx::Result<Option<OrgMember>> {
    sqlx::query_as::<_, OrgMember>(
        r"
        UPDATE org_members
        SET role = $3
        WHERE org_id = $1 AND user_id = $2
        RETURNING *
        ",
    )
    .bind(org_id)
    .bind(user_id)
    .bind(role)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_org_member_role", org_id = %org_id, user_id = %user_id))
}

/// Remove a member. Their team memberships in this org are removed in the
/// same transaction: a team role may only exist on top of an org role.
pub async fn remove_member(pool: &PgPool, org_id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
        DELETE FROM team_members tm
        USING teams t
        WHERE tm.team_id = t.id AND t.org_id = $1 AND tm.user_id = $2
        ",
    )
    .bind(org_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .map_err(db_error!("remove_org_member_teams", org_id = %org_id, user_id = %user_id))?;

    let result = sqlx::query("DELETE FROM org_members WHERE org_id = $1 AND user_id = $2")
        .bind(org_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error!("remove_org_member", org_id = %org_id, user_id = %user_id))?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// Count members holding the owner role.
pub async fn count_owners(pool: &PgPool, org_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM org_members WHERE org_id = $1 AND role = $2")
        .bind(org_id)
        .bind(OrgRole::Owner)
        .fetch_one(pool)
        .await
        .map_err(db_error!("count_org_owners", org_id = %org_id))
}
