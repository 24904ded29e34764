//! Request handlers for the roster domain API

pub mod auth;
pub mod invitations;
pub mod parents;
pub mod players;
pub mod teams;
pub mod users;
