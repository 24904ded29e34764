//! Real-time updates over WebSocket
//!
//! Clients connect to `/ws`, authenticate with their access token as the
//! first message, then subscribe to teams. Domain handlers publish
//! [`WsEvent`]s through the [`ConnectionRegistry`]; team-scoped events
//! reach that team's subscribers, club-wide events reach every connection.

pub mod events;
pub mod handler;
pub mod registry;

pub use events::WsEvent;
pub use handler::websocket_handler;
pub use registry::ConnectionRegistry;
