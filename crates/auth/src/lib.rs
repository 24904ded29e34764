//! Clubdesk authentication and authorization
//!
//! - Local JWT credentials: short-lived access tokens + rotating refresh tokens
//! - Password verification (bcrypt)
//! - OAuth federation: Google/Apple ID-token verification against provider JWKS
//! - `AuthBackend`: token → active user resolution over the users table
//! - `VisibilityScope`: per-role row visibility, re-derived on every request
//! - Axum extractors: `AuthUser` plus role guards (`CoachUser`, `StaffUser`, `AdminUser`)

pub mod backend;
pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod jwt;
pub mod oauth;
pub mod password;
pub mod scope;
pub mod types;

pub use backend::AuthBackend;
pub use claims::{Claims, TokenType};
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{AdminUser, AuthUser, CoachUser, ParentUser, StaffUser};
pub use oauth::{OAuthProvider, OAuthUserInfo, OAuthVerifier};
pub use scope::{TeamScope, VisibilityScope};
pub use types::{AuthIdentity, TokenPair, UserRole};
