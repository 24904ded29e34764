//! Shared utilities, configuration, and error handling for Clubdesk
//!
//! This crate provides common functionality used across the Clubdesk application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Pagination and validated-JSON extractors

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use db::{connect_pool, RepositoryError};
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
