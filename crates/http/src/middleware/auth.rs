use crate::error::HttpError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bazaar_core::Principal;
use std::ops::Deref;

/// Principal attached by the permission middleware
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub Principal);

impl Deref for AuthenticatedPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthenticatedPrincipal
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Self)
            .ok_or_else(|| HttpError::unauthenticated("Principal not resolved for this route"))
    }
}
