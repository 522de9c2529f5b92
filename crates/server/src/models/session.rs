//! Session-related types.

use serde::{Deserialize, Serialize};

use online_shop_core::UserId;

/// Session-stored user identity.
///
/// Only the id is kept; role and profile are reloaded from the database on
/// every authenticated request so a demotion or deletion takes effect at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
