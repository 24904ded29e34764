//! HTTP API for the activities domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ActivitiesState;
pub use routes::routes;
