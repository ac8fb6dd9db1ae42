//! Sitewide banner messages.
//!
//! The maintenance module manages at most one banner record (tracked via
//! `ReadOnly.MessageID`); clients fetch active banners from the public
//! endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::types::MaintenanceError;
use crate::api::AppState;

/// Location value for banners shown on every page.
pub const BASE_LOCATION: &str = "[Base]";

/// CSS class clients use to style the maintenance banner.
pub const ALERT_CSS_CLASS: &str = "AlertMessage";

/// Sitewide banner record.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, utoipa::ToSchema)]
pub struct SiteMessage {
    pub id: Uuid,
    pub content: String,
    pub location: String,
    pub css_class: String,
    pub enabled: bool,
    pub allow_dismiss: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Queries
// ============================================================================

/// Fetch a banner record by ID.
pub async fn get_message(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<SiteMessage>> {
    sqlx::query_as(
        r"
        SELECT id, content, location, css_class, enabled, allow_dismiss, created_at, updated_at
        FROM site_messages
        WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a maintenance banner record.
///
/// Maintenance banners are sitewide and not dismissable.
pub async fn insert_message(
    pool: &PgPool,
    content: &str,
    enabled: bool,
) -> sqlx::Result<SiteMessage> {
    sqlx::query_as(
        r"
        INSERT INTO site_messages (id, content, location, css_class, enabled, allow_dismiss)
        VALUES ($1, $2, $3, $4, $5, FALSE)
        RETURNING id, content, location, css_class, enabled, allow_dismiss, created_at, updated_at
        ",
    )
    .bind(Uuid::now_v7())
    .bind(content)
    .bind(BASE_LOCATION)
    .bind(ALERT_CSS_CLASS)
    .bind(enabled)
    .fetch_one(pool)
    .await
}

/// Update an existing banner record. Returns `None` if the row is gone.
pub async fn update_message(
    pool: &PgPool,
    id: Uuid,
    content: &str,
    enabled: bool,
) -> sqlx::Result<Option<SiteMessage>> {
    sqlx::query_as(
        r"
        UPDATE site_messages
        SET content = $2,
            enabled = $3,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, content, location, css_class, enabled, allow_dismiss, created_at, updated_at
        ",
    )
    .bind(id)
    .bind(content)
    .bind(enabled)
    .fetch_optional(pool)
    .await
}

/// Delete a banner record. Deleting an absent row is not an error.
pub async fn delete_message(pool: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM site_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// List active sitewide banners.
///
/// GET `/api/messages/active`
#[utoipa::path(
    get,
    path = "/api/messages/active",
    tag = "messages",
    responses(
        (status = 200, description = "Active sitewide banners", body = [SiteMessage]),
    ),
)]
#[tracing::instrument(skip(state))]
pub async fn list_active_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<SiteMessage>>, MaintenanceError> {
    let messages: Vec<SiteMessage> = sqlx::query_as(
        r"
        SELECT id, content, location, css_class, enabled, allow_dismiss, created_at, updated_at
        FROM site_messages
        WHERE enabled AND location = $1
        ORDER BY created_at ASC
        ",
    )
    .bind(BASE_LOCATION)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(messages))
}
