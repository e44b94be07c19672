//! Axum middleware and extractor for the bearer access gate

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{claims::Identity, errors::AuthError, token::TokenVerifier};

/// Extractor for the verified caller - requires `require_identity` upstream
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(Authenticated)
            .ok_or_else(|| {
                AuthError::Internal("Identity not found - access gate not configured".to_owned())
            })
    }
}

/// Access gate middleware.
///
/// 1. Skips CORS preflight requests
/// 2. Rejects requests without a `Bearer` credential with 401
/// 3. Rejects any credential that fails verification with 403
/// 4. Inserts the verified [`Identity`] into the request extensions
pub async fn require_identity(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_preflight_request(request.method(), request.headers()) {
        return next.run(request).await;
    }

    let Some(token) = extract_bearer_token(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "request without bearer token");
        return AuthError::Unauthenticated.into_response();
    };

    let identity = match verifier.verify(token).and_then(|claims| claims.identity()) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "token rejected");
            return AuthError::Forbidden.into_response();
        }
    };

    tracing::debug!(user_id = identity.user_id, role = %identity.role, "caller authenticated");
    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Preflight requests are OPTIONS requests carrying `Origin` and
/// `Access-Control-Request-Method`.
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
