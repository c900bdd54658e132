//! Access Tokens
//!
//! Claim construction and HS256 JWT issuance/validation.

use crate::config::AuthConfig;
use crate::crypto::CryptoPrimitives;
use crate::error::AuthError;
use crate::models::UserIdentity;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

// ============================================
// Claims
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimType {
    Name,
    NameIdentifier,
    TokenId,
    FirstName,
    LastName,
}

impl ClaimType {
    /// JSON key the claim is written under
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Name => "unique_name",
            ClaimType::NameIdentifier => "sub",
            ClaimType::TokenId => "jti",
            ClaimType::FirstName => "FirstName",
            ClaimType::LastName => "LastName",
        }
    }
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub kind: ClaimType,
    pub value: String,
}

/// Ordered claims for one token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    claims: Vec<Claim>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ClaimType, value: impl Into<String>) {
        self.claims.push(Claim {
            kind,
            value: value.into(),
        });
    }

    pub fn get(&self, kind: ClaimType) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter()
    }
}

/// Decoded access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User id
    pub sub: String,
    /// Username
    pub unique_name: String,
    /// Per-token unique identifier
    pub jti: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

// ============================================
// Issuer
// ============================================

pub struct TokenIssuer {
    crypto: Arc<dyn CryptoPrimitives>,
    secret: String,
    issuer: String,
    audience: String,
    ttl: Duration,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig, crypto: Arc<dyn CryptoPrimitives>) -> Result<Self, AuthError> {
        if config.jwt_secret.is_empty() {
            return Err(AuthError::Config("JWT:Secret must be set".into()));
        }
        if config.jwt_issuer.is_empty() {
            return Err(AuthError::Config("JWT:ValidIssuer must be set".into()));
        }
        if config.jwt_audience.is_empty() {
            return Err(AuthError::Config("JWT:ValidAudience must be set".into()));
        }

        let ttl = Duration::try_seconds(config.access_token_expiration)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| AuthError::Config("JWT:AccessExpiration is out of range".into()))?;

        Ok(Self {
            crypto,
            secret: config.jwt_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            ttl,
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        })
    }

    /// Map a user to token claims. Every call gets a new token id.
    pub fn build_claims(&self, user: &UserIdentity) -> ClaimSet {
        let mut bytes = [0u8; 16];
        self.crypto.random_bytes(&mut bytes);
        let token_id = uuid::Builder::from_random_bytes(bytes).into_uuid();

        let mut claims = ClaimSet::new();
        claims.push(ClaimType::Name, user.username.as_str());
        claims.push(ClaimType::NameIdentifier, user.id.to_string());
        claims.push(ClaimType::TokenId, token_id.to_string());
        claims.push(ClaimType::FirstName, user.first_name.as_str());
        claims.push(ClaimType::LastName, user.last_name.as_str());
        claims
    }

    /// Sign `claims` together with issuer, audience and expiry
    pub fn issue(&self, claims: &ClaimSet) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now.checked_add_signed(self.ttl).ok_or_else(|| {
            tracing::error!(ttl = %self.ttl, "Token expiry overflows the clock");
            AuthError::Internal
        })?;

        let mut payload = Map::new();
        for claim in claims.iter() {
            payload.insert(claim.kind.as_str().to_string(), Value::String(claim.value.clone()));
        }
        payload.insert("iss".into(), Value::String(self.issuer.clone()));
        payload.insert("aud".into(), Value::String(self.audience.clone()));
        payload.insert("iat".into(), Value::from(now.timestamp()));
        payload.insert("exp".into(), Value::from(exp.timestamp()));

        self.crypto.sign_and_encode(&payload, self.secret.as_bytes())
    }

    /// Validate signature, issuer, audience and expiry
    pub fn validate(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

/// Parse a token id claim
pub fn parse_token_id(claims: &AccessTokenClaims) -> Option<Uuid> {
    Uuid::parse_str(&claims.jti).ok()
}
