//! Roster entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clubdesk_auth::{OAuthProvider, UserRole};

use crate::domain::validation::generate_invitation_token;

/// How long an invitation stays valid.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// A club member's account.
///
/// `password_hash` is `None` for OAuth-only accounts and never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    /// OAuth sign-ups start with a provisional role until they pick one
    pub role_selected: bool,
    pub is_active: bool,
    /// Email confirmed, either via invitation or a verified OAuth claim
    pub is_verified: bool,
    /// No password set; the account authenticates through a provider
    pub is_oauth_only: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A team within the club.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub age_group: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
    pub coach_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Handball field positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "player_position", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Goalkeeper,
    LeftWing,
    LeftBack,
    CentreBack,
    RightBack,
    RightWing,
    Pivot,
}

/// Link between a parent account and a child's player profile.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ParentChild {
    pub id: Uuid,
    pub parent_id: Uuid,
    /// The child's player id, not their user id
    pub child_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Stored lifecycle status of an invitation.
///
/// Transitions are enforced by [`crate::domain::state::InvitationStateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

/// An invitation to join the club under a given role.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub team_id: Option<Uuid>,
    #[serde(skip_serializing)]
    pub token: String,
    pub status: InvitationStatus,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    /// The account created when the invitation was accepted
    pub accepted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Build a fresh pending invitation with a new token and 7 day expiry.
    pub fn new(
        email: String,
        first_name: String,
        last_name: String,
        role: UserRole,
        team_id: Option<Uuid>,
        invited_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            first_name,
            last_name,
            role,
            team_id,
            token: generate_invitation_token(),
            status: InvitationStatus::Pending,
            invited_by,
            expires_at: now + chrono::Duration::days(INVITATION_TTL_DAYS),
            accepted_at: None,
            accepted_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the stored expiry has passed. The stored status may still
    /// say pending; it is flipped lazily on verify and accept.
    pub fn is_past_expiry(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// A federated identity linked to a user account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OAuthAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: OAuthProvider,
    pub provider_account_id: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_invitation_is_pending_with_future_expiry() {
        let inviter = Uuid::new_v4();
        let invitation = Invitation::new(
            "new@club.example".to_string(),
            "Nora".to_string(),
            "Berg".to_string(),
            UserRole::Player,
            Some(Uuid::new_v4()),
            inviter,
        );
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert!(!invitation.is_past_expiry());
        assert!(invitation.expires_at > invitation.created_at);
        assert!(!invitation.token.is_empty());
    }

    #[test]
    fn test_invitation_tokens_are_unique() {
        let a = Invitation::new(
            "a@club.example".to_string(),
            "Ana".to_string(),
            "Lind".to_string(),
            UserRole::Coach,
            None,
            Uuid::new_v4(),
        );
        let b = Invitation::new(
            "b@club.example".to_string(),
            "Ben".to_string(),
            "Lind".to_string(),
            UserRole::Coach,
            None,
            Uuid::new_v4(),
        );
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_invitation_token_not_serialized() {
        let invitation = Invitation::new(
            "a@club.example".to_string(),
            "Ana".to_string(),
            "Lind".to_string(),
            UserRole::Player,
            None,
            Uuid::new_v4(),
        );
        let json = serde_json::to_value(&invitation).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["email"], "a@club.example");
    }
}
