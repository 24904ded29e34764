//! Roster domain: users, teams, players, parent links, invitations

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{
    InvitationEvent, InvitationGuardContext, InvitationState, InvitationStateMachine, StateError,
};

// Re-export repository types
pub use repository::{
    accept_invitation_tx, create_parent_account_tx, create_player_account_tx, link_parent_tx,
    InvitationRepository, OAuthAccountRepository, ParentRepository, PlayerRepository,
    PlayerWithUser, RosterRepositories, TeamRepository, UserRepository,
};

// Re-export API types
pub use api::routes;
pub use api::RosterState;
