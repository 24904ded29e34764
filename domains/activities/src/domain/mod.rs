//! Domain model for activities: entities and validation rules

pub mod entities;
pub mod validation;
