//! Module lifecycle.
//!
//! Enabling seeds a default banner text; disabling removes the managed
//! banner record and every `ReadOnly.` key in one pass, so the very next
//! session hydration observes an empty [`super::RestrictionConfig`].

use sqlx::PgPool;

use super::banner;
use super::store::{ConfigStore, ConfigStoreError};
use super::types::{read_message_id, MaintenanceError, CONFIG_NAMESPACE, MESSAGE_KEY};

/// Banner text seeded when the module is enabled without one.
pub const DEFAULT_MESSAGE: &str = "Forum is in read-only mode!";

/// Enable the module: seed the default banner text if none is stored.
///
/// Idempotent; run at service startup and from the enable endpoint.
pub async fn enable(store: &dyn ConfigStore) -> Result<(), ConfigStoreError> {
    if store.get(MESSAGE_KEY).await?.is_none() {
        store
            .set(MESSAGE_KEY, serde_json::Value::String(DEFAULT_MESSAGE.into()))
            .await?;
    }

    Ok(())
}

/// Disable the module: delete the managed banner record, then remove
/// every maintenance setting atomically.
///
/// After this returns, filtering is off for every user on their next
/// session hydration.
pub async fn disable(store: &dyn ConfigStore, pool: &PgPool) -> Result<(), MaintenanceError> {
    if let Some(message_id) = read_message_id(store).await? {
        banner::delete_message(pool, message_id).await?;
    }

    store.remove_prefix(CONFIG_NAMESPACE).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maintenance::store::MemoryConfigStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_enable_seeds_default_message() {
        let store = MemoryConfigStore::new();

        enable(&store).await.unwrap();

        assert_eq!(
            store.get(MESSAGE_KEY).await.unwrap(),
            Some(json!(DEFAULT_MESSAGE))
        );
    }

    #[tokio::test]
    async fn test_enable_keeps_existing_message() {
        let store = MemoryConfigStore::new();
        store
            .set(MESSAGE_KEY, json!("Back at noon."))
            .await
            .unwrap();

        enable(&store).await.unwrap();

        assert_eq!(
            store.get(MESSAGE_KEY).await.unwrap(),
            Some(json!("Back at noon."))
        );
    }
}
