//! Activities domain state and auth backend integration

use axum::extract::FromRef;

use clubdesk_auth::AuthBackend;
use clubdesk_ws::ConnectionRegistry;

use crate::repository::ActivitiesRepositories;

/// Application state for the activities domain
#[derive(Clone)]
pub struct ActivitiesState {
    pub repos: ActivitiesRepositories,
    pub auth: AuthBackend,
    /// Live WebSocket connections for push updates
    pub ws: ConnectionRegistry,
}

impl FromRef<ActivitiesState> for AuthBackend {
    fn from_ref(state: &ActivitiesState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<ActivitiesState> for ConnectionRegistry {
    fn from_ref(state: &ActivitiesState) -> Self {
        state.ws.clone()
    }
}
