//! Clubdesk application composition root
//!
//! Composes the domain routers, the WebSocket endpoint and the health
//! probes into a single application.

use axum::{
    extract::State,
    routing::get,
    Router,
};
use sqlx::PgPool;

use clubdesk_activities::ActivitiesState;
use clubdesk_auth::{AuthBackend, AuthConfig};
use clubdesk_common::config::Config;
use clubdesk_email::{create_email_service, EmailConfig};
use clubdesk_roster::RosterState;
use clubdesk_ws::{websocket_handler, ConnectionRegistry};

/// Create the main application router with all routes and shared state
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let auth_config = AuthConfig::from_env()?;
    let auth = AuthBackend::new(pool.clone(), auth_config);

    let email_config = EmailConfig::from_env()?;
    let email = create_email_service(&email_config).await?;

    let registry = ConnectionRegistry::new();

    let roster_state = RosterState {
        repos: clubdesk_roster::RosterRepositories::new(pool.clone()),
        auth: auth.clone(),
        email,
        frontend_url: config.frontend_url.clone(),
    };

    let activities_state = ActivitiesState {
        repos: clubdesk_activities::ActivitiesRepositories::new(pool.clone()),
        auth,
        ws: registry,
    };

    let app = Router::new()
        .route("/", get(|| async { "Clubdesk API" }))
        .merge(health_routes(pool))
        .merge(clubdesk_roster::routes().with_state(roster_state))
        .merge(clubdesk_activities::routes().with_state(activities_state.clone()))
        .route(
            "/ws",
            get(websocket_handler::<ActivitiesState>).with_state(activities_state),
        );

    Ok(app)
}

/// Liveness and readiness probes
fn health_routes(pool: PgPool) -> Router {
    Router::new()
        .route("/health/live", get(|| async { "OK" }))
        .route("/health/ready", get(readiness))
        .with_state(pool)
}

/// Readiness: the server is up and the database answers.
async fn readiness(State(pool): State<PgPool>) -> Result<&'static str, clubdesk_common::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await
        .map_err(|e| clubdesk_common::Error::Internal(format!("database not ready: {e}")))?;
    Ok("OK")
}
