//! Maintenance Settings API Handlers
//!
//! Admin endpoints for the read-only maintenance window: choose the
//! restricted actions and exempt roles, manage the banner message, and
//! enable/disable the module. All routes are gated on the
//! settings-management capability in the router.

use std::collections::{BTreeMap, BTreeSet};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use roost_common::{action_suffix, Role};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::banner;
use super::lifecycle;
use super::types::{
    read_message_id, MaintenanceError, MaintenanceSettings, EXEMPT_ROLES_KEY, MESSAGE_ID_KEY,
    MESSAGE_KEY, RESTRICTIONS_KEY, SHOW_ALERT_KEY,
};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::db;

/// Maximum restricted actions per save.
const MAX_RESTRICTIONS: usize = 50;

/// Maximum exempt roles per save.
const MAX_EXEMPT_ROLES: usize = 100;

/// Maximum banner message length (mirrored in the `length` attribute).
const MAX_MESSAGE_LENGTH: usize = 500;

lazy_static! {
    /// Action names are single dot-free identifiers.
    static ref ACTION_NAME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap();
}

// ============================================================================
// Router
// ============================================================================

/// Build the maintenance routes for nesting under
/// `/api/admin/maintenance`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/enable", post(enable_module))
        .route("/disable", post(disable_module))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// One checkbox group on the settings screen: an action and every known
/// permission carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ActionGroup {
    pub action: String,
    pub permissions: Vec<String>,
}

/// Current settings plus the form metadata the settings screen renders.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MaintenanceSettingsResponse {
    pub settings: MaintenanceSettings,
    pub actions: Vec<ActionGroup>,
    #[schema(value_type = Vec<Object>)]
    pub roles: Vec<Role>,
}

/// Request body for saving maintenance settings.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateMaintenanceSettingsRequest {
    /// Action names to restrict (e.g. "Add", "Edit").
    pub restrictions: Vec<String>,
    /// Roles that should **not** be restricted. Admin users always keep
    /// all permissions.
    pub exempt_role_ids: Vec<Uuid>,
    /// Banner text; empty removes the banner record.
    #[validate(length(max = 500, message = "Message too long"))]
    pub message: String,
    /// Whether the banner is shown.
    #[serde(default)]
    pub show_alert: bool,
}

// ============================================================================
// Validation
// ============================================================================

fn validate_settings(body: &UpdateMaintenanceSettingsRequest) -> Result<(), MaintenanceError> {
    body.validate()
        .map_err(|e| MaintenanceError::Validation(e.to_string()))?;

    if body.restrictions.len() > MAX_RESTRICTIONS {
        return Err(MaintenanceError::Validation(format!(
            "Too many restrictions ({}, max {MAX_RESTRICTIONS})",
            body.restrictions.len()
        )));
    }

    if body.exempt_role_ids.len() > MAX_EXEMPT_ROLES {
        return Err(MaintenanceError::Validation(format!(
            "Too many exempt roles ({}, max {MAX_EXEMPT_ROLES})",
            body.exempt_role_ids.len()
        )));
    }

    for action in &body.restrictions {
        if !ACTION_NAME.is_match(action) {
            return Err(MaintenanceError::Validation(format!(
                "Invalid action name: {action}"
            )));
        }
    }

    Ok(())
}

/// Group the platform's known permission keys by action, for the
/// settings screen checkbox list. Keys without a derivable action are
/// skipped.
fn consolidate_actions(keys: &[String]) -> Vec<ActionGroup> {
    let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for key in keys {
        if let Some(action) = action_suffix(key) {
            groups.entry(action).or_default().push(key.clone());
        }
    }

    groups
        .into_iter()
        .map(|(action, permissions)| ActionGroup {
            action: action.to_string(),
            permissions,
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

/// Get maintenance settings and form metadata.
///
/// GET `/api/admin/maintenance`
#[utoipa::path(
    get,
    path = "/api/admin/maintenance",
    tag = "maintenance",
    responses(
        (status = 200, description = "Current settings and form metadata", body = MaintenanceSettingsResponse),
        (status = 403, description = "Settings capability required"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<MaintenanceSettingsResponse>, MaintenanceError> {
    let settings = MaintenanceSettings::load(&*state.store).await?;

    let keys = db::list_permission_keys(&state.db).await?;
    let actions = consolidate_actions(&keys);

    let roles = db::list_roles(&state.db)
        .await?
        .into_iter()
        .map(|role| Role {
            id: role.id,
            name: role.name,
        })
        .collect();

    Ok(Json(MaintenanceSettingsResponse {
        settings,
        actions,
        roles,
    }))
}

/// Save maintenance settings and synchronize the banner record.
///
/// PUT `/api/admin/maintenance`
#[utoipa::path(
    put,
    path = "/api/admin/maintenance",
    tag = "maintenance",
    request_body = UpdateMaintenanceSettingsRequest,
    responses(
        (status = 200, description = "Settings saved", body = MaintenanceSettings),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Settings capability required"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, body), fields(user_id = %auth_user.id))]
async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<UpdateMaintenanceSettingsRequest>,
) -> Result<Json<MaintenanceSettings>, MaintenanceError> {
    validate_settings(&body)?;

    let store = &*state.store;
    let message = body.message.trim();

    // Dedupe and keep the stored arrays in a deterministic order.
    let restrictions: BTreeSet<&String> = body.restrictions.iter().collect();
    let exempt_role_ids: BTreeSet<Uuid> = body.exempt_role_ids.iter().copied().collect();

    store.set(RESTRICTIONS_KEY, json!(restrictions)).await?;
    store.set(EXEMPT_ROLES_KEY, json!(exempt_role_ids)).await?;
    store.set(MESSAGE_KEY, json!(message)).await?;
    store.set(SHOW_ALERT_KEY, json!(body.show_alert)).await?;

    sync_banner(&state, message, body.show_alert).await?;

    db::write_audit_log(
        &state.db,
        auth_user.id,
        "maintenance.settings.updated",
        Some("site"),
        None,
        Some(json!({
            "restrictions": restrictions.len(),
            "exempt_roles": exempt_role_ids.len(),
            "show_alert": body.show_alert,
        })),
    )
    .await
    .ok();

    let settings = MaintenanceSettings::load(store).await?;
    Ok(Json(settings))
}

/// Keep the managed banner record in step with the saved message.
///
/// Empty text deletes the record; otherwise the record tracked by
/// `ReadOnly.MessageID` is updated (or recreated if the row is gone).
async fn sync_banner(
    state: &AppState,
    message: &str,
    show_alert: bool,
) -> Result<(), MaintenanceError> {
    let store = &*state.store;
    let current = read_message_id(store).await?;

    if message.is_empty() {
        if let Some(message_id) = current {
            banner::delete_message(&state.db, message_id).await?;
            store.remove(MESSAGE_ID_KEY).await?;
        }
        return Ok(());
    }

    let record = match current {
        Some(message_id) => {
            match banner::update_message(&state.db, message_id, message, show_alert).await? {
                Some(record) => record,
                // The row vanished underneath us; recreate it.
                None => banner::insert_message(&state.db, message, show_alert).await?,
            }
        }
        None => banner::insert_message(&state.db, message, show_alert).await?,
    };

    store.set(MESSAGE_ID_KEY, json!(record.id)).await?;

    Ok(())
}

/// Enable the maintenance module.
///
/// POST `/api/admin/maintenance/enable`
#[tracing::instrument(skip(state), fields(user_id = %auth_user.id))]
async fn enable_module(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<StatusCode, MaintenanceError> {
    lifecycle::enable(&*state.store).await?;

    db::write_audit_log(
        &state.db,
        auth_user.id,
        "maintenance.enabled",
        Some("site"),
        None,
        None,
    )
    .await
    .ok();

    Ok(StatusCode::NO_CONTENT)
}

/// Disable the maintenance module, reverting all users to full
/// permissions on their next session hydration.
///
/// POST `/api/admin/maintenance/disable`
#[tracing::instrument(skip(state), fields(user_id = %auth_user.id))]
async fn disable_module(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<StatusCode, MaintenanceError> {
    lifecycle::disable(&*state.store, &state.db).await?;

    db::write_audit_log(
        &state.db,
        auth_user.id,
        "maintenance.disabled",
        Some("site"),
        None,
        None,
    )
    .await
    .ok();

    Ok(StatusCode::NO_CONTENT)
}
