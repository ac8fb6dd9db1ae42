//! Authentication and authorization.
//!
//! Access tokens are minted by the platform identity service; this
//! service validates them and loads the account they belong to.

pub mod error;
pub mod jwt;
pub mod middleware;

pub use error::{AuthError, AuthResult};
pub use middleware::{require_auth, require_settings_manage, AuthUser};
