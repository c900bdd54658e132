//! Authentication HTTP Handlers
//!
//! A successful outcome is `200 OK`, a rejected one `400 Bad Request`; both
//! carry the outcome as the body.

use crate::error::AuthError;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

/// Create authentication routes
pub fn create_routes(auth_service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .with_state(auth_service)
}

fn outcome_response(outcome: AuthOutcome) -> Response {
    let status = if outcome.is_succeed {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(outcome)).into_response()
}

/// POST /api/v1/auth/register
pub async fn register(
    State(auth): State<AuthState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let outcome = auth.register(req).await?;
    Ok(outcome_response(outcome))
}

/// POST /api/v1/auth/login
///
/// On success the outcome message is the access token
pub async fn login(
    State(auth): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let outcome = auth.login(req).await?;
    Ok(outcome_response(outcome))
}
