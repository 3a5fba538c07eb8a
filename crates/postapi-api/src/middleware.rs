use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::token::{TokenCodec, TokenError};

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, inserted into the request extensions by
/// [`require_auth`]. Handlers take it as an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}

/// Why a request was turned away. Only logged; the client always gets a 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("authorization header is not a bearer token")]
    BadHeaderFormat,
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AuthError {
    fn into_api_error(self) -> ApiError {
        match self {
            AuthError::MissingHeader => ApiError::Unauthorized("Missing authorization header"),
            AuthError::BadHeaderFormat => ApiError::Unauthorized("Invalid authorization format"),
            // Token failures are not told apart for the client.
            AuthError::Token(_) => ApiError::Unauthorized("Invalid token"),
        }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`. The prefix match
/// is exact and case-sensitive, and the remainder must be non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingHeader)?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::BadHeaderFormat),
    }
}

pub fn authenticate(tokens: &TokenCodec, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
    let token = bearer_token(headers)?;
    let username = tokens.verify(token)?;
    Ok(AuthUser { username })
}

/// Extract and validate the bearer token, then hand the request on with the
/// caller's [`AuthUser`] attached. Rejected requests never reach `next`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.tokens, req.headers()).map_err(|e| {
        debug!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
        e.into_api_error()
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            warn!("AuthUser missing on {}; route is not behind require_auth", parts.uri.path());
            ApiError::Unauthorized("Unauthorized")
        })
    }
}
