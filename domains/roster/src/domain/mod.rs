//! Domain model for the roster: entities, invitation lifecycle, validation

pub mod entities;
pub mod state;
pub mod validation;
