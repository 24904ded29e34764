//! Repository implementations for the roster domain

pub mod invitations;
pub mod oauth;
pub mod parents;
pub mod players;
pub mod teams;
pub mod transactions;
pub mod users;

use sqlx::{PgPool, Postgres, Transaction};

use clubdesk_common::RepositoryError;

pub use invitations::InvitationRepository;
pub use oauth::OAuthAccountRepository;
pub use parents::ParentRepository;
pub use players::{NewPlayer, PlayerChanges, PlayerRepository, PlayerWithUser};
pub use teams::{NewTeam, TeamChanges, TeamRepository};
pub use transactions::{
    accept_invitation_tx, create_parent_account_tx, create_player_account_tx, link_parent_tx,
};
pub use users::{NewUser, UserChanges, UserRepository};

/// Combined repository access for the roster domain
#[derive(Clone)]
pub struct RosterRepositories {
    pool: PgPool,
    pub users: UserRepository,
    pub teams: TeamRepository,
    pub players: PlayerRepository,
    pub parents: ParentRepository,
    pub invitations: InvitationRepository,
    pub oauth: OAuthAccountRepository,
}

impl RosterRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            teams: TeamRepository::new(pool.clone()),
            players: PlayerRepository::new(pool.clone()),
            parents: ParentRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            oauth: OAuthAccountRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Map unique-constraint violations to `AlreadyExists`.
pub(crate) fn map_insert_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::AlreadyExists;
        }
    }
    RepositoryError::Connection(err)
}
