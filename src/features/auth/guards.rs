//! Authorization guards for handlers.
//!
//! Guards read the identity that the auth middleware placed in the request
//! extensions. Strict guards refuse when it is absent; [`OptionalUser`] never
//! refuses and exists for the public submission path.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// Guard for officer-level operations.
///
/// Allows users carrying the "officer" or "admin" role. Being authenticated
/// alone is not enough.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireOfficer(user): RequireOfficer) { ... }
/// ```
pub struct RequireOfficer(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireOfficer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        if !user.is_officer() {
            return Err(AppError::Forbidden("Officer access required".to_string()));
        }

        Ok(RequireOfficer(user.clone()))
    }
}

/// Caller identity when one was verified, `None` for anonymous callers
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(
            parts.extensions.get::<AuthenticatedUser>().cloned(),
        ))
    }
}
