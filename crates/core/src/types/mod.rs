//! Core types for Sage Bistro.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod role;
pub mod username;

pub use id::*;
pub use role::{Role, RoleParseError};
pub use username::{Username, UsernameError};
