//! Maintenance Mode Types
//!
//! Configuration keys, the parsed restriction config, request/response
//! types, and the module error type.

use std::collections::HashSet;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::{ConfigStore, ConfigStoreError};

// ============================================================================
// Configuration Keys
// ============================================================================

/// Namespace prefix for every key the module owns.
pub const CONFIG_NAMESPACE: &str = "ReadOnly.";

/// Action names to strip from permission sets (JSON array of strings).
pub const RESTRICTIONS_KEY: &str = "ReadOnly.Restrictions";

/// Roles **exempt** from filtering (JSON array of role ID strings).
///
/// The stored name is historical and the inverse of its effect: these are
/// the roles that are *not* restricted. Kept verbatim for compatibility
/// with existing configuration stores.
pub const EXEMPT_ROLES_KEY: &str = "ReadOnly.Roles";

/// Banner text (JSON string).
pub const MESSAGE_KEY: &str = "ReadOnly.Message";

/// Banner visibility flag (JSON bool).
pub const SHOW_ALERT_KEY: &str = "ReadOnly.ShowAlert";

/// ID of the banner record the module manages (JSON string).
pub const MESSAGE_ID_KEY: &str = "ReadOnly.MessageID";

// ============================================================================
// Restriction Config
// ============================================================================

/// The configuration the session filter evaluates.
///
/// Absent or malformed stored values parse to empty sets: missing
/// configuration means "restrict nothing", which is exactly the disabled
/// state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictionConfig {
    /// Action names stripped from non-exempt users.
    pub restricted_actions: HashSet<String>,
    /// Roles whose members keep their full permission set.
    pub exempt_roles: HashSet<Uuid>,
}

impl RestrictionConfig {
    /// Whether the config restricts nothing and exempts nobody.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restricted_actions.is_empty() && self.exempt_roles.is_empty()
    }

    /// Read the config fresh from the store.
    pub async fn load(store: &dyn ConfigStore) -> Result<Self, ConfigStoreError> {
        let restricted_actions = string_set(store.get(RESTRICTIONS_KEY).await?, RESTRICTIONS_KEY);
        let exempt_roles = role_set(store.get(EXEMPT_ROLES_KEY).await?, EXEMPT_ROLES_KEY);

        Ok(Self {
            restricted_actions,
            exempt_roles,
        })
    }
}

/// Parse a stored JSON array of strings, tolerating absence and malformed
/// shapes.
fn string_set(value: Option<serde_json::Value>, key: &str) -> HashSet<String> {
    let Some(value) = value else {
        return HashSet::new();
    };

    match serde_json::from_value::<Vec<String>>(value) {
        Ok(items) => items.into_iter().collect(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Malformed config value, treating as empty");
            HashSet::new()
        }
    }
}

/// Parse a stored JSON array of role ID strings, skipping entries that
/// are not UUIDs.
fn role_set(value: Option<serde_json::Value>, key: &str) -> HashSet<Uuid> {
    string_set(value, key)
        .into_iter()
        .filter_map(|entry| match entry.parse::<Uuid>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(key, entry = %entry, "Skipping non-UUID role entry");
                None
            }
        })
        .collect()
}

// ============================================================================
// Settings
// ============================================================================

/// The full persisted settings, as shown on the settings screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MaintenanceSettings {
    /// Restricted action names.
    pub restrictions: Vec<String>,
    /// Role IDs exempt from filtering.
    pub exempt_role_ids: Vec<Uuid>,
    /// Banner text (empty removes the banner).
    pub message: String,
    /// Whether the banner is shown.
    pub show_alert: bool,
}

impl MaintenanceSettings {
    /// Read the settings fresh from the store.
    pub async fn load(store: &dyn ConfigStore) -> Result<Self, ConfigStoreError> {
        let mut restrictions: Vec<String> =
            string_set(store.get(RESTRICTIONS_KEY).await?, RESTRICTIONS_KEY)
                .into_iter()
                .collect();
        restrictions.sort();

        let mut exempt_role_ids: Vec<Uuid> =
            role_set(store.get(EXEMPT_ROLES_KEY).await?, EXEMPT_ROLES_KEY)
                .into_iter()
                .collect();
        exempt_role_ids.sort();

        let message = store
            .get(MESSAGE_KEY)
            .await?
            .and_then(|value| value.as_str().map(ToString::to_string))
            .unwrap_or_default();

        let show_alert = store
            .get(SHOW_ALERT_KEY)
            .await?
            .and_then(|value| value.as_bool())
            .unwrap_or(false);

        Ok(Self {
            restrictions,
            exempt_role_ids,
            message,
            show_alert,
        })
    }
}

/// Read the ID of the managed banner record, if one is stored.
pub async fn read_message_id(store: &dyn ConfigStore) -> Result<Option<Uuid>, ConfigStoreError> {
    Ok(store
        .get(MESSAGE_ID_KEY)
        .await?
        .and_then(|value| value.as_str().and_then(|s| s.parse().ok())))
}

// ============================================================================
// Error Type
// ============================================================================

/// Errors from maintenance-mode operations.
#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration store error")]
    Config(#[from] ConfigStoreError),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for MaintenanceError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            Self::Config(err) => {
                tracing::error!("Config store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Configuration store error".to_string(),
                )
            }
            Self::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Database error".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maintenance::store::MemoryConfigStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_absent_config_is_empty() {
        let store = MemoryConfigStore::new();

        let config = RestrictionConfig::load(&store).await.unwrap();

        assert!(config.is_empty());
    }

    #[tokio::test]
    async fn test_load_parses_actions_and_roles() {
        let store = MemoryConfigStore::new();
        let role = Uuid::now_v7();

        store
            .set(RESTRICTIONS_KEY, json!(["Add", "Edit"]))
            .await
            .unwrap();
        store
            .set(EXEMPT_ROLES_KEY, json!([role.to_string()]))
            .await
            .unwrap();

        let config = RestrictionConfig::load(&store).await.unwrap();

        assert_eq!(
            config.restricted_actions,
            HashSet::from(["Add".to_string(), "Edit".to_string()])
        );
        assert_eq!(config.exempt_roles, HashSet::from([role]));
    }

    #[tokio::test]
    async fn test_load_malformed_value_treated_as_empty() {
        let store = MemoryConfigStore::new();

        store
            .set(RESTRICTIONS_KEY, json!({ "not": "an array" }))
            .await
            .unwrap();

        let config = RestrictionConfig::load(&store).await.unwrap();

        assert!(config.restricted_actions.is_empty());
    }

    #[tokio::test]
    async fn test_load_skips_non_uuid_role_entries() {
        let store = MemoryConfigStore::new();
        let role = Uuid::now_v7();

        store
            .set(EXEMPT_ROLES_KEY, json!([role.to_string(), "Moderator"]))
            .await
            .unwrap();

        let config = RestrictionConfig::load(&store).await.unwrap();

        assert_eq!(config.exempt_roles, HashSet::from([role]));
    }

    #[tokio::test]
    async fn test_settings_load_defaults() {
        let store = MemoryConfigStore::new();

        let settings = MaintenanceSettings::load(&store).await.unwrap();

        assert_eq!(settings, MaintenanceSettings::default());
    }

    #[tokio::test]
    async fn test_read_message_id() {
        let store = MemoryConfigStore::new();
        assert_eq!(read_message_id(&store).await.unwrap(), None);

        let id = Uuid::now_v7();
        store
            .set(MESSAGE_ID_KEY, json!(id.to_string()))
            .await
            .unwrap();
        assert_eq!(read_message_id(&store).await.unwrap(), Some(id));

        store.set(MESSAGE_ID_KEY, json!(42)).await.unwrap();
        assert_eq!(read_message_id(&store).await.unwrap(), None);
    }
}
