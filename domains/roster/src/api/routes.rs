//! Route definitions for the roster domain API

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{auth, invitations, parents, players, teams, users};
use super::middleware::RosterState;

/// Authentication and OAuth routes
fn auth_routes() -> Router<RosterState> {
    Router::new()
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/refresh", post(auth::refresh))
        .route("/v1/auth/me", get(auth::me))
        .route("/v1/oauth/google", post(auth::oauth_google))
        .route("/v1/oauth/apple", post(auth::oauth_apple))
        .route("/v1/oauth/role", post(auth::set_role))
}

/// User account routes
fn user_routes() -> Router<RosterState> {
    Router::new()
        .route("/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/v1/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}

/// Team and roster routes
fn team_routes() -> Router<RosterState> {
    Router::new()
        .route("/v1/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/v1/teams/{id}",
            get(teams::get_team)
                .patch(teams::update_team)
                .delete(teams::delete_team),
        )
        .route(
            "/v1/teams/{team_id}/players/{player_id}",
            post(teams::add_player_to_team).delete(teams::remove_player_from_team),
        )
        .route(
            "/v1/teams/{team_id}/invitations",
            get(invitations::list_for_team),
        )
}

/// Player routes
fn player_routes() -> Router<RosterState> {
    Router::new()
        .route(
            "/v1/players",
            get(players::list_players).post(players::create_player),
        )
        .route(
            "/v1/players/{id}",
            get(players::get_player)
                .patch(players::update_player)
                .delete(players::delete_player),
        )
        .route("/v1/players/{id}/parents", get(players::get_player_parents))
}

/// Parent-child link routes
fn parent_routes() -> Router<RosterState> {
    Router::new()
        .route(
            "/v1/parents/children",
            get(parents::my_children).post(parents::link_child),
        )
        .route(
            "/v1/parents/children/{child_id}",
            delete(parents::unlink_child),
        )
}

/// Invitation routes
fn invitation_routes() -> Router<RosterState> {
    Router::new()
        .route("/v1/invitations", post(invitations::create_invitation))
        .route("/v1/invitations/sent", get(invitations::list_sent))
        .route("/v1/invitations/verify/{token}", get(invitations::verify))
        .route("/v1/invitations/accept", post(invitations::accept))
        .route(
            "/v1/invitations/{id}",
            delete(invitations::revoke),
        )
        .route("/v1/invitations/{id}/resend", post(invitations::resend))
}

/// All roster domain API routes
pub fn routes() -> Router<RosterState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(team_routes())
        .merge(player_routes())
        .merge(parent_routes())
        .merge(invitation_routes())
}
