//! Maintenance Read-Only Mode
//!
//! Temporarily restricts write/edit permission actions while the forum
//! is in a maintenance window:
//! - Settings: which actions are restricted, which roles are exempt, and
//!   an optional sitewide banner message
//! - Filter: strips restricted actions from a session user's effective
//!   permission set at hydration time
//!
//! Configuration is read fresh on every hydration, so saving settings or
//! disabling the module takes effect on the next session load.

pub mod banner;
pub mod filter;
pub mod lifecycle;
pub mod settings;
pub mod store;
pub mod types;

pub use filter::restrict_permissions;
pub use store::{ConfigStore, ConfigStoreError, MemoryConfigStore, PgConfigStore};
pub use types::{MaintenanceError, MaintenanceSettings, RestrictionConfig};
