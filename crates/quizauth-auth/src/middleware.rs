//! Authorization middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::AuthError;
use crate::identity::AuthenticatedIdentity;
use crate::interceptor::{AuthInterceptor, CallMetadata};

/// Request extension slot for the validated identity.
///
/// Private, so nothing outside this module can plant an identity.
#[derive(Clone)]
struct IdentityKey(AuthenticatedIdentity);

/// Authorization middleware
///
/// The request path is the operation name and the headers are the call
/// metadata. On success the identity (if any) is stored in request
/// extensions for [`RequireIdentity`].
pub async fn authorize_request(
    State(interceptor): State<Arc<AuthInterceptor>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let operation = request.uri().path().to_string();
    let metadata = CallMetadata::from_headers(request.headers());

    let scope = interceptor.authorize(&operation, Some(&metadata)).await?;
    if let Ok(identity) = scope.into_identity() {
        request.extensions_mut().insert(IdentityKey(identity));
    }

    Ok(next.run(request).await)
}

/// Extractor for handlers that need the caller's identity
///
/// Rejects with [`AuthError::Unauthenticated`] when the request did not
/// pass through [`authorize_request`] with a valid token.
#[derive(Debug, Clone)]
pub struct RequireIdentity(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityKey>()
            .map(|key| RequireIdentity(key.0.clone()))
            .ok_or(AuthError::Unauthenticated)
    }
}
