//! End-to-end maintenance flow over the configuration-store seam.
//!
//! Drives enable → configure → hydrate → disable against the in-memory
//! store; no database required. Settings saves are simulated as the
//! store writes the settings handler performs.

use serde_json::json;
use uuid::Uuid;

use roost_common::{PermissionSet, PermissionValue, Role, SessionUser};
use roost_server::maintenance::lifecycle::{self, DEFAULT_MESSAGE};
use roost_server::maintenance::types::{
    CONFIG_NAMESPACE, EXEMPT_ROLES_KEY, MESSAGE_KEY, RESTRICTIONS_KEY, SHOW_ALERT_KEY,
};
use roost_server::maintenance::{
    restrict_permissions, ConfigStore, MemoryConfigStore, RestrictionConfig,
};

fn moderator_role() -> Role {
    Role {
        id: Uuid::now_v7(),
        name: "Moderator".to_string(),
    }
}

fn member(roles: Vec<Role>) -> SessionUser {
    SessionUser {
        id: Uuid::now_v7(),
        username: "alice".to_string(),
        display_name: "Alice".to_string(),
        is_admin: false,
        roles,
    }
}

fn sample_permissions() -> PermissionSet {
    let mut set = PermissionSet::new();
    set.insert("Site.Settings.Manage", PermissionValue::Granted(true));
    set.insert(
        "Forum.Discussions.Add",
        PermissionValue::Scoped(json!({ "CategoryID": 1 })),
    );
    set.insert("Forum.Discussions.View", PermissionValue::Granted(true));
    set
}

/// Write the settings the way a save does.
async fn save_settings(store: &dyn ConfigStore, restrictions: &[&str], exempt_roles: &[Uuid]) {
    store
        .set(RESTRICTIONS_KEY, json!(restrictions))
        .await
        .unwrap();
    store
        .set(EXEMPT_ROLES_KEY, json!(exempt_roles))
        .await
        .unwrap();
    store.set(SHOW_ALERT_KEY, json!(true)).await.unwrap();
}

#[tokio::test]
async fn test_enable_then_configure_then_hydrate() {
    let store = MemoryConfigStore::new();

    // Enable seeds the default banner text.
    lifecycle::enable(&store).await.unwrap();
    assert_eq!(
        store.get(MESSAGE_KEY).await.unwrap(),
        Some(json!(DEFAULT_MESSAGE))
    );

    // Operator restricts Add and Manage, exempting moderators.
    let moderator = moderator_role();
    save_settings(&store, &["Add", "Manage"], &[moderator.id]).await;

    let config = RestrictionConfig::load(&store).await.unwrap();

    // A plain member loses Add and Manage but keeps View.
    let user = member(vec![Role {
        id: Uuid::now_v7(),
        name: "Member".to_string(),
    }]);
    let filtered = restrict_permissions(&user, sample_permissions(), &config);
    assert_eq!(filtered.len(), 1);
    assert!(filtered.contains_key("Forum.Discussions.View"));

    // A moderator keeps everything.
    let mod_user = member(vec![moderator]);
    let kept = restrict_permissions(&mod_user, sample_permissions(), &config);
    assert_eq!(kept, sample_permissions());

    // An admin keeps everything regardless of roles.
    let admin = SessionUser {
        is_admin: true,
        ..member(vec![])
    };
    let kept = restrict_permissions(&admin, sample_permissions(), &config);
    assert_eq!(kept, sample_permissions());
}

#[tokio::test]
async fn test_saves_are_last_write_wins() {
    let store = MemoryConfigStore::new();

    save_settings(&store, &["Add", "Edit"], &[]).await;
    save_settings(&store, &["Delete"], &[]).await;

    let config = RestrictionConfig::load(&store).await.unwrap();

    assert!(config.restricted_actions.contains("Delete"));
    assert!(!config.restricted_actions.contains("Add"));
    assert!(!config.restricted_actions.contains("Edit"));
}

#[tokio::test]
async fn test_disable_reverts_every_user_on_next_hydration() {
    let store = MemoryConfigStore::new();

    lifecycle::enable(&store).await.unwrap();
    save_settings(&store, &["Add", "Manage", "View"], &[]).await;

    // Disable removes the whole namespace in one pass.
    store.remove_prefix(CONFIG_NAMESPACE).await.unwrap();

    let config = RestrictionConfig::load(&store).await.unwrap();
    assert!(config.is_empty());

    let user = member(vec![]);
    let filtered = restrict_permissions(&user, sample_permissions(), &config);
    assert_eq!(filtered, sample_permissions());

    // Seeded message is gone too; re-enable seeds it again.
    assert_eq!(store.get(MESSAGE_KEY).await.unwrap(), None);
    lifecycle::enable(&store).await.unwrap();
    assert_eq!(
        store.get(MESSAGE_KEY).await.unwrap(),
        Some(json!(DEFAULT_MESSAGE))
    );
}

#[tokio::test]
async fn test_partial_config_restricts_with_no_exemptions() {
    let store = MemoryConfigStore::new();

    // Only restrictions saved; the exempt-role key is absent.
    store.set(RESTRICTIONS_KEY, json!(["Add"])).await.unwrap();

    let config = RestrictionConfig::load(&store).await.unwrap();
    assert!(config.exempt_roles.is_empty());

    let user = member(vec![moderator_role()]);
    let filtered = restrict_permissions(&user, sample_permissions(), &config);
    assert!(!filtered.contains_key("Forum.Discussions.Add"));
}
