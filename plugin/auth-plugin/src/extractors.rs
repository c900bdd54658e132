//! Authentication Extractors

use crate::error::AuthError;
use crate::token::{parse_token_id, AccessTokenClaims};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Authenticated user information extracted from token claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub token_id: Option<Uuid>,
}

impl AuthUser {
    /// Create user from token claims
    pub fn from_claims(claims: &AccessTokenClaims) -> Result<Self, AuthError> {
        let id = claims.sub.parse().map_err(|_| {
            tracing::debug!(sub = %claims.sub, "Token subject is not a user id");
            AuthError::InvalidToken
        })?;

        Ok(Self {
            id,
            username: claims.unique_name.clone(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
            token_id: parse_token_id(claims),
        })
    }
}

/// Requires [`require_auth`](crate::middleware::require_auth) to have run
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<AccessTokenClaims>()
            .ok_or(AuthError::InvalidToken)?;

        AuthUser::from_claims(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> AccessTokenClaims {
        AccessTokenClaims {
            sub: sub.into(),
            unique_name: "alice".into(),
            jti: "6f1c1d7e-41a4-4b8e-9a51-3cf0a4c9f0b2".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            iss: "blogapi".into(),
            aud: "blogapi-clients".into(),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_from_claims() {
        let user = AuthUser::from_claims(&claims("42")).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.username, "alice");
        assert!(user.token_id.is_some());
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        assert_eq!(
            AuthUser::from_claims(&claims("alice")),
            Err(AuthError::InvalidToken)
        );
    }
}
