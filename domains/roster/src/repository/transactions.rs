//! Multi-statement operations that must commit or fail as a unit

use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use clubdesk_auth::UserRole;
use clubdesk_common::RepositoryError;

use crate::domain::entities::{Invitation, Position, User};
use crate::repository::map_insert_error;

const USER_RETURNING: &str = "id, email, password_hash, first_name, last_name, phone, role, \
                              role_selected, is_active, is_verified, is_oauth_only, \
                              created_at, updated_at";

async fn insert_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password_hash: Option<&str>,
    first_name: &str,
    last_name: &str,
    phone: Option<&str>,
    role: UserRole,
    is_verified: bool,
) -> Result<User, RepositoryError> {
    let query = format!(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, phone, role,
                            role_selected, is_active, is_verified, is_oauth_only,
                            created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, TRUE, $8, FALSE, NOW(), NOW())
         RETURNING {USER_RETURNING}"
    );
    sqlx::query_as::<_, User>(&query)
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .bind(role)
        .bind(is_verified)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_insert_error)
}

/// Profile fields captured when a player account is created.
#[derive(Debug, Clone, Default)]
pub struct PlayerProfile {
    pub team_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub position: Option<Position>,
    pub jersey_number: Option<i32>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

async fn insert_player_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    profile: &PlayerProfile,
) -> Result<Uuid, RepositoryError> {
    sqlx::query_scalar(
        "INSERT INTO players (id, user_id, team_id, date_of_birth, position, jersey_number,
                              emergency_contact_name, emergency_contact_phone,
                              created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(profile.team_id)
    .bind(profile.date_of_birth)
    .bind(profile.position)
    .bind(profile.jersey_number)
    .bind(&profile.emergency_contact_name)
    .bind(&profile.emergency_contact_phone)
    .fetch_one(&mut **tx)
    .await
    .map_err(map_insert_error)
}

/// Accept an invitation: create the account under the invited name and
/// email, create a player profile when the invited role is player, and
/// mark the invitation accepted. Invited accounts count as verified.
pub async fn accept_invitation_tx(
    tx: &mut Transaction<'_, Postgres>,
    invitation: &Invitation,
    password_hash: &str,
) -> Result<User, RepositoryError> {
    let user = insert_user_tx(
        tx,
        &invitation.email,
        Some(password_hash),
        &invitation.first_name,
        &invitation.last_name,
        None,
        invitation.role,
        true,
    )
    .await?;

    if invitation.role == UserRole::Player {
        let profile = PlayerProfile {
            team_id: invitation.team_id,
            ..PlayerProfile::default()
        };
        insert_player_tx(tx, user.id, &profile).await?;
    }

    let updated = sqlx::query(
        "UPDATE invitations
         SET status = 'accepted', accepted_at = NOW(), accepted_by = $2, updated_at = NOW()
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(invitation.id)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(RepositoryError::InvalidData(
            "Invitation is no longer pending".to_string(),
        ));
    }

    sqlx::query(
        "INSERT INTO user_activities (id, user_id, activity_type, description, created_at)
         VALUES ($1, $2, 'invitation_accepted', $3, NOW())",
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(format!("Accepted invitation {}", invitation.id))
    .execute(&mut **tx)
    .await?;

    Ok(user)
}

/// Create a player account (user + player profile) in one unit.
pub async fn create_player_account_tx(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
    phone: Option<&str>,
    profile: &PlayerProfile,
) -> Result<(User, Uuid), RepositoryError> {
    let user = insert_user_tx(
        tx,
        email,
        Some(password_hash),
        first_name,
        last_name,
        phone,
        UserRole::Player,
        false,
    )
    .await?;
    let player_id = insert_player_tx(tx, user.id, profile).await?;
    Ok((user, player_id))
}

/// Create a parent account and link it to a child player in one unit.
pub async fn create_parent_account_tx(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
    child_player_id: Uuid,
) -> Result<User, RepositoryError> {
    let user = insert_user_tx(
        tx,
        email,
        Some(password_hash),
        first_name,
        last_name,
        None,
        UserRole::Parent,
        false,
    )
    .await?;

    sqlx::query(
        "INSERT INTO parent_children (id, parent_id, child_id, created_at)
         VALUES ($1, $2, $3, NOW())",
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(child_player_id)
    .execute(&mut **tx)
    .await
    .map_err(map_insert_error)?;

    Ok(user)
}

/// Link an existing parent account to a child player inside a
/// transaction.
pub async fn link_parent_tx(
    tx: &mut Transaction<'_, Postgres>,
    parent_id: Uuid,
    child_player_id: Uuid,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO parent_children (id, parent_id, child_id, created_at)
         VALUES ($1, $2, $3, NOW())
         ON CONFLICT (parent_id, child_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(parent_id)
    .bind(child_player_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
