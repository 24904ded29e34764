//! HTTP API for the roster domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::RosterState;
pub use routes::routes;
