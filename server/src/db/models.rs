//! Database models for the host identity tables.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// User account record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Role record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A single permission grant attached to a role.
#[derive(Debug, Clone, FromRow)]
pub struct PermissionGrant {
    pub role_id: Uuid,
    pub permission_key: String,
    pub value: serde_json::Value,
}
