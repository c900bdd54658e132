//! Authentication Middleware
//!
//! Bearer-token guard for routes that require a logged-in user.

use crate::error::AuthError;
use crate::handlers::AuthState;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Require authenticated user
///
/// Validates the token and stores its claims in request extensions for
/// the [`AuthUser`](crate::AuthUser) extractor. Use with
/// `axum::middleware::from_fn_with_state`.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = bearer_token(header).ok_or(AuthError::InvalidToken)?;
    let claims = auth.tokens().validate(token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
