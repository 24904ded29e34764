//! Axum extractors for authenticated callers and role guards
//!
//! Generic over the application state: any state that can hand out an
//! [`AuthBackend`] via `FromRef` gets these extractors for free.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::backend::AuthBackend;
use crate::error::AuthError;
use crate::jwt;
use crate::types::{AuthIdentity, UserRole};

async fn authenticate_request<S>(parts: &mut Parts, state: &S) -> Result<AuthIdentity, AuthError>
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    let backend = AuthBackend::from_ref(state);
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationHeader)?;
    let token = jwt::extract_bearer_token(header)?;
    backend.authenticate(token).await
}

/// Any authenticated, active user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthIdentity);

/// Coach or admin.
#[derive(Debug, Clone)]
pub struct CoachUser(pub AuthIdentity);

/// Coach, supervisor or admin.
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthIdentity);

/// Admin only.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthIdentity);

/// Parent or admin.
#[derive(Debug, Clone)]
pub struct ParentUser(pub AuthIdentity);

impl<S> FromRequestParts<S> for AuthUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthUser(authenticate_request(parts, state).await?))
    }
}

impl<S> FromRequestParts<S> for CoachUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = authenticate_request(parts, state).await?;
        match identity.role {
            UserRole::Coach | UserRole::Admin => Ok(CoachUser(identity)),
            _ => Err(AuthError::Forbidden),
        }
    }
}

impl<S> FromRequestParts<S> for StaffUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = authenticate_request(parts, state).await?;
        if identity.role.is_staff() {
            Ok(StaffUser(identity))
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = authenticate_request(parts, state).await?;
        match identity.role {
            UserRole::Admin => Ok(AdminUser(identity)),
            _ => Err(AuthError::Forbidden),
        }
    }
}

impl<S> FromRequestParts<S> for ParentUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = authenticate_request(parts, state).await?;
        match identity.role {
            UserRole::Parent | UserRole::Admin => Ok(ParentUser(identity)),
            _ => Err(AuthError::Forbidden),
        }
    }
}

macro_rules! impl_deref {
    ($($name:ident),+) => {
        $(
            impl std::ops::Deref for $name {
                type Target = AuthIdentity;

                fn deref(&self) -> &Self::Target {
                    &self.0
                }
            }
        )+
    };
}

impl_deref!(AuthUser, CoachUser, StaffUser, AdminUser, ParentUser);
