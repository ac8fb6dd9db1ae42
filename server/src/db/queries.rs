//! Host identity queries.

use sqlx::PgPool;
use uuid::Uuid;

use super::models::{PermissionGrant, RoleRow, User};

/// Find a user by ID.
pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as(
        r"
        SELECT id, username, display_name, email, is_admin, created_at
        FROM users
        WHERE id = $1
        ",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// List all roles, name order.
pub async fn list_roles(pool: &PgPool) -> sqlx::Result<Vec<RoleRow>> {
    sqlx::query_as(
        r"
        SELECT id, name, created_at
        FROM roles
        ORDER BY name ASC
        ",
    )
    .fetch_all(pool)
    .await
}

/// List the roles assigned to a user.
pub async fn list_user_roles(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<RoleRow>> {
    sqlx::query_as(
        r"
        SELECT r.id, r.name, r.created_at
        FROM roles r
        INNER JOIN user_roles ur ON ur.role_id = r.id
        WHERE ur.user_id = $1
        ORDER BY r.name ASC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// List every permission grant reachable through a user's roles.
pub async fn list_user_permission_grants(
    pool: &PgPool,
    user_id: Uuid,
) -> sqlx::Result<Vec<PermissionGrant>> {
    sqlx::query_as(
        r"
        SELECT rp.role_id, rp.permission_key, rp.value
        FROM role_permissions rp
        INNER JOIN user_roles ur ON ur.role_id = rp.role_id
        WHERE ur.user_id = $1
        ORDER BY rp.permission_key ASC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// List every permission key known to the platform.
///
/// Feeds the settings screen, which consolidates keys by action.
pub async fn list_permission_keys(pool: &PgPool) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(
        r"
        SELECT DISTINCT permission_key
        FROM role_permissions
        ORDER BY permission_key ASC
        ",
    )
    .fetch_all(pool)
    .await
}

/// Write a system audit log entry.
pub async fn write_audit_log(
    pool: &PgPool,
    actor_id: Uuid,
    action: &str,
    target_type: Option<&str>,
    target_id: Option<Uuid>,
    details: Option<serde_json::Value>,
) -> sqlx::Result<()> {
    sqlx::query(
        r"
        INSERT INTO audit_log (id, actor_id, action, target_type, target_id, details)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(Uuid::now_v7())
    .bind(actor_id)
    .bind(action)
    .bind(target_type)
    .bind(target_id)
    .bind(details)
    .execute(pool)
    .await?;

    Ok(())
}
