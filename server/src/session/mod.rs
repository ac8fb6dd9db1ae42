//! Session hydration.
//!
//! Loads the authenticated user's roles and base permission set, applies
//! the maintenance restriction filter, and returns the effective set.
//! Configuration is read fresh on every hydration, so settings changes
//! and disables take effect on the very next session load.
//!
//! The filter only runs here: callers that check permissions through
//! paths bypassing the hydrated session are outside its reach.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roost_common::{PermissionSet, PermissionValue, Role, SessionUser};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::db;
use crate::maintenance::{restrict_permissions, ConfigStoreError, RestrictionConfig};

/// Errors from session hydration.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Configuration store error")]
    Config(#[from] ConfigStoreError),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        tracing::error!("Session hydration failed: {}", self);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "INTERNAL_ERROR",
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

/// A hydrated session: the user plus their effective permissions.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SessionResponse {
    #[schema(value_type = Object)]
    pub user: SessionUser,
    #[schema(value_type = Object)]
    pub permissions: PermissionSet,
}

/// Load a user's base permission set: the merged grants of all their
/// roles, before any maintenance filtering.
pub async fn load_base_permissions(pool: &PgPool, user_id: Uuid) -> sqlx::Result<PermissionSet> {
    let grants = db::list_user_permission_grants(pool, user_id).await?;

    let mut set = PermissionSet::new();
    for grant in grants {
        merge_grant(&mut set, &grant.permission_key, grant.value.into());
    }

    Ok(set)
}

/// Merge one grant into the set.
///
/// When two roles grant the same key: a boolean `true` wins over
/// `false`, two scoped arrays are unioned, anything else keeps the first
/// value seen.
fn merge_grant(set: &mut PermissionSet, key: &str, incoming: PermissionValue) {
    let replacement = match (set.get(key), incoming) {
        (None, incoming) => Some(incoming),
        (Some(PermissionValue::Granted(false)), incoming @ PermissionValue::Granted(true)) => {
            Some(incoming)
        }
        (
            Some(PermissionValue::Scoped(existing)),
            PermissionValue::Scoped(serde_json::Value::Array(new_items)),
        ) => existing.as_array().map(|existing_items| {
            let mut merged = existing_items.clone();
            for item in new_items {
                if !merged.contains(&item) {
                    merged.push(item);
                }
            }
            PermissionValue::Scoped(serde_json::Value::Array(merged))
        }),
        _ => None,
    };

    if let Some(value) = replacement {
        set.insert(key, value);
    }
}

/// Hydrate the current session.
///
/// GET `/api/session`
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "session",
    responses(
        (status = 200, description = "The hydrated session", body = SessionResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state), fields(user_id = %auth_user.id))]
pub async fn get_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<SessionResponse>, SessionError> {
    let roles = db::list_user_roles(&state.db, auth_user.id)
        .await?
        .into_iter()
        .map(|role| Role {
            id: role.id,
            name: role.name,
        })
        .collect();

    let user = SessionUser {
        id: auth_user.id,
        username: auth_user.username,
        display_name: auth_user.display_name,
        is_admin: auth_user.is_admin,
        roles,
    };

    let base = load_base_permissions(&state.db, user.id).await?;

    // Fresh read on every hydration; no caching layer in between.
    let config = RestrictionConfig::load(&*state.store).await?;
    let permissions = restrict_permissions(&user, base, &config);

    Ok(Json(SessionResponse { user, permissions }))
}
