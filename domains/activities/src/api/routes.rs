//! Route definitions for the activities domain API

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{attendance, events, games, news};
use super::middleware::ActivitiesState;

/// Game scheduling and result routes
fn game_routes() -> Router<ActivitiesState> {
    Router::new()
        .route("/v1/games", get(games::list_games).post(games::create_game))
        .route(
            "/v1/games/{id}",
            get(games::get_game)
                .patch(games::update_game)
                .delete(games::delete_game),
        )
        .route("/v1/games/{id}/result", patch(games::record_result))
}

/// Calendar event routes
fn event_routes() -> Router<ActivitiesState> {
    Router::new()
        .route(
            "/v1/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/v1/events/{id}",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
}

/// Attendance tracking routes
fn attendance_routes() -> Router<ActivitiesState> {
    Router::new()
        .route(
            "/v1/attendance",
            get(attendance::list_attendance).post(attendance::create_attendance),
        )
        .route("/v1/attendance/bulk", post(attendance::bulk_upsert))
        .route("/v1/attendance/initialize", post(attendance::initialize))
        .route("/v1/attendance/stats", get(attendance::stats))
        .route(
            "/v1/attendance/{id}",
            get(attendance::get_attendance).patch(attendance::update_attendance),
        )
}

/// News routes
fn news_routes() -> Router<ActivitiesState> {
    Router::new()
        .route("/v1/news", get(news::list_news).post(news::create_news))
        .route(
            "/v1/news/{id}",
            get(news::get_news)
                .patch(news::update_news)
                .delete(news::delete_news),
        )
        .route("/v1/news/{id}/publish", post(news::publish_news))
}

/// All activities domain API routes
pub fn routes() -> Router<ActivitiesState> {
    Router::new()
        .merge(game_routes())
        .merge(event_routes())
        .merge(attendance_routes())
        .merge(news_routes())
}
