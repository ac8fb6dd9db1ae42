//! User Types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role reference as exposed to sessions and settings screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// The authenticated user as seen by a hydrated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    /// User ID.
    pub id: Uuid,
    /// Username (unique).
    pub username: String,
    /// Display name.
    pub display_name: String,
    /// Site administrators bypass all permission filtering.
    pub is_admin: bool,
    /// Resolved role memberships.
    pub roles: Vec<Role>,
}

impl SessionUser {
    /// Iterate over the IDs of the user's roles.
    pub fn role_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.roles.iter().map(|role| role.id)
    }
}
