// ── User domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::Email;
use crate::credentials::PasswordHash;

/// Account role. Capabilities derive from it, see [`crate::access`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    #[serde(alias = "receptionist")]
    #[strum(to_string = "staff", serialize = "receptionist")]
    Staff,
    #[default]
    #[serde(alias = "user")]
    #[strum(to_string = "guest", serialize = "user")]
    Guest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: Email,
    pub password_hash: PasswordHash,
    #[serde(default)]
    pub role: Role,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Front-desk shift (staff only), e.g. "morning".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.email.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_legacy_names() {
        assert_eq!("receptionist".parse::<Role>().unwrap(), Role::Staff);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::Guest);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn role_displays_canonical_name() {
        assert_eq!(Role::Staff.to_string(), "staff");
    }

    #[test]
    fn missing_role_defaults_to_guest() {
        let user: User = serde_json::from_str(
            r#"{"email":"a@b.cl","password_hash":"00","created_at":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Guest);
        assert_eq!(user.display_name(), "a@b.cl");
    }
}
