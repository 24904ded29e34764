//! Request handlers for the activities domain API

pub mod attendance;
pub mod events;
pub mod games;
pub mod news;
