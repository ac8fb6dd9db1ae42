//! Restriction filter.
//!
//! Computes the effective permission set for a session user while the
//! forum is in a read-only maintenance window.

use roost_common::{PermissionSet, SessionUser};

use super::types::RestrictionConfig;

/// Compute the effective permission set for a session user.
///
/// Resolution order:
/// 1. Site admins keep the full set
/// 2. Holding any exempt role keeps the full set
/// 3. Otherwise every entry whose derived action is restricted is
///    dropped; everything else is kept unchanged
///
/// The action is derived from the entry key, except for legacy alias
/// entries whose string value names the permission (see
/// [`roost_common::PermissionValue::action`]). An entry with no
/// derivable action never matches and is kept.
///
/// Matching is by action suffix only: `Site.Settings.Add` and
/// `Forum.Discussions.Add` are both dropped when `Add` is restricted.
/// There is no per-namespace granularity.
///
/// Returns a new set; the caller installs it on the session. Entries are
/// only ever removed, never altered or added, so filtering an already
/// filtered set is a no-op.
#[must_use]
pub fn restrict_permissions(
    user: &SessionUser,
    permissions: PermissionSet,
    config: &RestrictionConfig,
) -> PermissionSet {
    // Admins are never restricted
    if user.is_admin {
        return permissions;
    }

    // Any one exempt role exempts the whole user
    if user.role_ids().any(|id| config.exempt_roles.contains(&id)) {
        return permissions;
    }

    if config.restricted_actions.is_empty() {
        return permissions;
    }

    permissions
        .into_iter()
        .filter(|(key, value)| match value.action(key) {
            Some(action) => !config.restricted_actions.contains(action),
            None => true,
        })
        .collect()
}
