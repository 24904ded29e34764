//! Roster domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;

use clubdesk_auth::AuthBackend;
use clubdesk_email::EmailService;

use crate::repository::RosterRepositories;

/// Application state for the roster domain
#[derive(Clone)]
pub struct RosterState {
    pub repos: RosterRepositories,
    pub auth: AuthBackend,
    pub email: Arc<dyn EmailService>,
    /// Base URL for links in outbound email
    pub frontend_url: String,
}

impl FromRef<RosterState> for AuthBackend {
    fn from_ref(state: &RosterState) -> Self {
        state.auth.clone()
    }
}
