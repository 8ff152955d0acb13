//! Session payload types.

use serde::{Deserialize, Serialize};

use sage_bistro_core::UserId;

/// Keys under which values are stored in the session.
pub mod session_keys {
    /// The logged-in user, as a [`super::SessionUser`].
    pub const CURRENT_USER: &str = "current_user";
}

/// The minimal identity stored in the session.
///
/// Role memberships are deliberately not stored here; the auth extractor
/// reloads them from the database on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    /// Unique user ID.
    pub id: UserId,
    /// Login identifier, kept for log context.
    pub username: String,
}
