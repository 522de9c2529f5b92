//! Caller identity and the privilege gate.
//!
//! Authentication happens outside the core (sessions on the server, the
//! operator's shell for the CLI). What reaches the core is a [`Caller`]: who is
//! asking and with which [`Role`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Role, UserId};

/// An authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Pass only for administrators.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Forbidden`] for non-admin callers.
    pub const fn require_admin(&self) -> Result<(), AccessError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AccessError::Forbidden)
        }
    }
}

/// Which orders a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderScope {
    /// Every order in the shop (administrators only).
    All,
    /// Orders owned by the caller.
    Mine,
}

/// The privilege or ownership check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("access denied")]
    Forbidden,
}
