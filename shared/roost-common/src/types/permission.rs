//! Permission Types
//!
//! String-keyed permission model. Keys are dot-delimited fully-qualified
//! names (`Namespace.Action` or `Namespace.Sub.Action`); the *action* is
//! the substring after the last dot.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single permission grant value.
///
/// The host stores grants in three historical shapes, and the shape
/// decides where the action name comes from:
/// - a plain boolean (`Granted`) — action derived from the entry key
/// - a string mirroring another fully-qualified permission name
///   (`Alias`) — action derived from the value
/// - a per-resource payload such as a list of category IDs (`Scoped`) —
///   payload is opaque, action derived from the entry key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionValue {
    /// Plain boolean grant.
    Granted(bool),
    /// Legacy entry whose value is itself a fully-qualified name.
    Alias(String),
    /// Per-resource payload, opaque to permission logic.
    Scoped(serde_json::Value),
}

impl PermissionValue {
    /// Derive the action for the entry this value belongs to.
    ///
    /// Returns `None` when no action can be derived (the relevant name
    /// contains no dot, or ends with one).
    #[must_use]
    pub fn action<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        match self {
            Self::Alias(name) => action_suffix(name),
            Self::Granted(_) | Self::Scoped(_) => action_suffix(key),
        }
    }
}

impl From<serde_json::Value> for PermissionValue {
    /// Map a raw stored grant onto the variant that decides action
    /// derivation: booleans are simple grants, strings are legacy
    /// aliases, everything else is an opaque scoped payload.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(granted) => Self::Granted(granted),
            serde_json::Value::String(name) => Self::Alias(name),
            other => Self::Scoped(other),
        }
    }
}

/// The substring after the last dot of a fully-qualified permission name.
///
/// `action_suffix("Forum.Discussions.Add")` is `Some("Add")`. Names
/// without a dot have no derivable action and yield `None`.
#[must_use]
pub fn action_suffix(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((_, action)) if !action.is_empty() => Some(action),
        _ => None,
    }
}

/// An ordered permission collection keyed by fully-qualified name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<String, PermissionValue>);

impl PermissionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a grant, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: PermissionValue) {
        self.0.insert(key.into(), value);
    }

    /// Look up a grant by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PermissionValue> {
        self.0.get(key)
    }

    /// Whether a grant exists for the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of grants in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no grants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over grants in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, PermissionValue> {
        self.0.iter()
    }
}

impl FromIterator<(String, PermissionValue)> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = (String, PermissionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PermissionSet {
    type Item = (String, PermissionValue);
    type IntoIter = btree_map::IntoIter<String, PermissionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = (&'a String, &'a PermissionValue);
    type IntoIter = btree_map::Iter<'a, String, PermissionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_suffix() {
        assert_eq!(action_suffix("Forum.Discussions.Add"), Some("Add"));
        assert_eq!(action_suffix("Site.Manage"), Some("Manage"));
        assert_eq!(action_suffix("NoDot"), None);
        assert_eq!(action_suffix("Trailing."), None);
        assert_eq!(action_suffix(""), None);
    }

    #[test]
    fn test_action_from_key_for_granted_and_scoped() {
        let granted = PermissionValue::Granted(true);
        assert_eq!(granted.action("Forum.Discussions.Edit"), Some("Edit"));

        let scoped = PermissionValue::Scoped(serde_json::json!({ "CategoryID": 1 }));
        assert_eq!(scoped.action("Forum.Discussions.Add"), Some("Add"));
    }

    #[test]
    fn test_action_from_value_for_alias() {
        let alias = PermissionValue::Alias("Site.Settings.Manage".to_string());
        // The key is ignored for aliases; the mirrored name decides.
        assert_eq!(alias.action("SomeKey"), Some("Manage"));
    }

    #[test]
    fn test_alias_without_dot_has_no_action() {
        let alias = PermissionValue::Alias("Manage".to_string());
        assert_eq!(alias.action("Forum.Discussions.Add"), None);
    }

    #[test]
    fn test_untagged_deserialization_shapes() {
        let value: PermissionValue = serde_json::from_str("true").unwrap();
        assert_eq!(value, PermissionValue::Granted(true));

        let value: PermissionValue = serde_json::from_str(r#""Site.Settings.Manage""#).unwrap();
        assert_eq!(value, PermissionValue::Alias("Site.Settings.Manage".to_string()));

        let value: PermissionValue = serde_json::from_str(r#"{"CategoryID":1}"#).unwrap();
        assert_eq!(
            value,
            PermissionValue::Scoped(serde_json::json!({ "CategoryID": 1 }))
        );
    }

    #[test]
    fn test_from_value_maps_shapes_to_variants() {
        assert_eq!(
            PermissionValue::from(serde_json::json!(false)),
            PermissionValue::Granted(false)
        );
        assert_eq!(
            PermissionValue::from(serde_json::json!("Forum.Discussions.View")),
            PermissionValue::Alias("Forum.Discussions.View".to_string())
        );
        assert_eq!(
            PermissionValue::from(serde_json::json!([1, 2, 3])),
            PermissionValue::Scoped(serde_json::json!([1, 2, 3]))
        );
    }

    #[test]
    fn test_permission_set_round_trip() {
        let mut set = PermissionSet::new();
        set.insert("Forum.Discussions.View", PermissionValue::Granted(true));
        set.insert(
            "Forum.Discussions.Add",
            PermissionValue::Scoped(serde_json::json!([1, 2])),
        );

        let json = serde_json::to_string(&set).unwrap();
        let back: PermissionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);
        assert_eq!(back.len(), 2);
        assert!(back.contains_key("Forum.Discussions.View"));
    }
}
