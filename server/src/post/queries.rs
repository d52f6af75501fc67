//! Database queries for posts.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{db_error, Post};

/// Create a post. The author is recorded as its immutable creator.
pub async fn create_post(
    pool: &PgPool,
    org_id: Uuid,
    team_id: Option<Uuid>,
    slug: &str,
    title: &str,
    content: &str,
    created_by: Uuid,
) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(
        r"
        INSERT INTO posts (id, org_id, team_id, slug, title, content, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        ",
    )
    .bind(Uuid::now_v7())
    .bind(org_id)
    .bind(team_id)
    .bind(slug)
    .bind(title)
    .bind(content)
    .bind(created_by)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_post", org_id = %org_id, slug = %slug))
}

/// List an organization's live posts, optionally filtered by team.
pub async fn list_posts(
    pool: &PgPool,
    org_id: Uuid,
    team_id: Option<Uuid>,
) -> sqlx::Result<Vec<Post>> {
    match team_id {
        Some(team_id) => {
            sqlx::query_as::<_, Post>(
                r"
                SELECT * FROM posts
                WHERE org_id = $1 AND team_id = $2 AND deleted_at IS NULL
                ORDER BY updated_at DESC
                ",
            )
            .bind(org_id)
            .bind(team_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Post>(
                r"
                SELECT * FROM posts
                WHERE org_id = $1 AND deleted_at IS NULL
                ORDER BY updated_at DESC
                ",
            )
            .bind(org_id)
            .fetch_all(pool)
            .await
        }
    }
    .map_err(db_error!("list_posts", org_id = %org_id))
}

/// Update a post's title or content.
pub async fn update_post(
    pool: &PgPool,
    post_id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        r"
        UPDATE posts
        SET title = COALESCE($2, title),
            content = COALESCE($3, content),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        ",
    )
    .bind(post_id)
    .bind(title)
    .bind(content)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_post", post_id = %post_id))
}

/// Soft-delete a post.
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE posts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(post_id)
    .execute(pool)
    .await
    .map_err(db_error!("delete_post", post_id = %post_id))?;

    Ok(result.rows_affected() > 0)
}

/// Assign or clear the post's maintainer.
pub async fn set_maintainer(
    pool: &PgPool,
    post_id: Uuid,
    maintainer_id: Option<Uuid>,
) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        r"
        UPDATE posts
        SET maintainer_id = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        ",
    )
    .bind(post_id)
    .bind(maintainer_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("set_post_maintainer", post_id = %post_id))
}
