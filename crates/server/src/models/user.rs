//! Shop accounts.
//!
//! The password hash never leaves the repository layer: [`User`] is the shape
//! returned to clients and stored nowhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use online_shop_core::access::Caller;
use online_shop_core::{Email, Role, UserId};

/// A shop account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The identity passed to access checks.
    #[must_use]
    pub const fn caller(&self) -> Caller {
        Caller::new(self.id, self.role)
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Administrative edit of an account. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl UserUpdate {
    /// Trimmed name, `None` when absent or blank.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_without_secrets() {
        let user = User {
            id: UserId::new(3),
            name: "Ольга".to_owned(),
            email: Email::parse("olga@example.ru").unwrap(),
            role: Role::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["email"], "olga@example.ru");
        assert!(json.get("password_hash").is_none());
        assert!(user.caller().is_admin());
    }

    #[test]
    fn test_update_partial_fields() {
        let update: UserUpdate = serde_json::from_str(r#"{"name": "  ", "role": "user"}"#).unwrap();
        assert_eq!(update.name(), None);
        assert_eq!(update.role, Some(Role::User));
        assert!(update.email.is_none());

        assert!(serde_json::from_str::<UserUpdate>(r#"{"email": "not-an-email"}"#).is_err());
    }
}
