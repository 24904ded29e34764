//! Core identity types shared across the workspace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Club-level role attached to every user account.
///
/// Authorization is role-driven: staff roles (`Coach`, `Supervisor`, `Admin`)
/// see club-wide data, while `Player` and `Parent` are scoped to their own
/// team respectively their children's teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Coach,
    Supervisor,
    Player,
    Parent,
}

impl UserRole {
    /// Staff roles may see and manage data beyond their own account.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Coach | UserRole::Supervisor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Coach => "coach",
            UserRole::Supervisor => "supervisor",
            UserRole::Player => "player",
            UserRole::Parent => "parent",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "coach" => Ok(UserRole::Coach),
            "supervisor" => Ok(UserRole::Supervisor),
            "player" => Ok(UserRole::Player),
            "parent" => Ok(UserRole::Parent),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller, resolved from a validated access token.
///
/// Re-read from the users table on every request so that deactivated
/// accounts and role changes take effect immediately, not at token expiry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Access + refresh token pair returned by login, refresh and OAuth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Admin,
            UserRole::Coach,
            UserRole::Supervisor,
            UserRole::Player,
            UserRole::Parent,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()), Ok(role));
        }
        assert!(UserRole::from_str("referee").is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Coach.is_staff());
        assert!(UserRole::Supervisor.is_staff());
        assert!(!UserRole::Player.is_staff());
        assert!(!UserRole::Parent.is_staff());
    }
}
