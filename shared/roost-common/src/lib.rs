//! Roost Common Library
//!
//! Shared types used by both server and clients.

pub mod types;

pub use types::*;
