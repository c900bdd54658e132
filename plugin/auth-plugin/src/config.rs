//! Authentication Configuration
//!
//! Values come from an opaque key-value source. Keys use the `Section:Name`
//! form (`JWT:Secret`); the environment loader maps a key to its variable by
//! replacing `:` with `_` and upper-casing (`JWT_SECRET`).

use crate::error::AuthError;
use std::env;

/// Signing secret for access tokens (required, min 32 chars)
pub const JWT_SECRET: &str = "JWT:Secret";
/// `iss` claim written into and required of every token (required)
pub const JWT_VALID_ISSUER: &str = "JWT:ValidIssuer";
/// `aud` claim written into and required of every token (required)
pub const JWT_VALID_AUDIENCE: &str = "JWT:ValidAudience";
/// Access token lifetime in seconds
pub const JWT_ACCESS_EXPIRATION: &str = "JWT:AccessExpiration";
/// PBKDF2 iteration count
pub const PASSWORD_ITERATIONS: &str = "Password:Iterations";

pub const DEFAULT_ACCESS_EXPIRATION: i64 = 3600;
/// Ten years
pub const MAX_ACCESS_EXPIRATION: i64 = 10 * 365 * 24 * 3600;
pub const MIN_PASSWORD_ITERATIONS: u32 = 10_000;
const MIN_SECRET_LENGTH: usize = 32;

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens (`JWT:Secret`)
    pub jwt_secret: String,

    /// Token issuer (`JWT:ValidIssuer`)
    pub jwt_issuer: String,

    /// Token audience (`JWT:ValidAudience`)
    pub jwt_audience: String,

    /// Access token expiration in seconds (`JWT:AccessExpiration`)
    pub access_token_expiration: i64,

    /// PBKDF2-HMAC-SHA256 iterations (`Password:Iterations`)
    pub password_iterations: u32,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| env::var(env_var_name(key)).ok())
    }

    /// Load configuration from any key-value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, AuthError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthError::Config(format!("{key} must be set")))
        };

        let config = Self {
            jwt_secret: required(JWT_SECRET)?,
            jwt_issuer: required(JWT_VALID_ISSUER)?,
            jwt_audience: required(JWT_VALID_AUDIENCE)?,
            access_token_expiration: parse_or(
                lookup(JWT_ACCESS_EXPIRATION),
                JWT_ACCESS_EXPIRATION,
                DEFAULT_ACCESS_EXPIRATION,
            )?,
            password_iterations: parse_or(
                lookup(PASSWORD_ITERATIONS),
                PASSWORD_ITERATIONS,
                MIN_PASSWORD_ITERATIONS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Config(format!(
                "{JWT_SECRET} must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        if self.jwt_issuer.is_empty() {
            return Err(AuthError::Config(format!("{JWT_VALID_ISSUER} must be set")));
        }

        if self.jwt_audience.is_empty() {
            return Err(AuthError::Config(format!("{JWT_VALID_AUDIENCE} must be set")));
        }

        if self.access_token_expiration <= 0 {
            return Err(AuthError::Config(format!(
                "{JWT_ACCESS_EXPIRATION} must be positive"
            )));
        }

        if self.access_token_expiration > MAX_ACCESS_EXPIRATION {
            return Err(AuthError::Config(format!(
                "{JWT_ACCESS_EXPIRATION} must be at most {MAX_ACCESS_EXPIRATION} seconds"
            )));
        }

        if self.password_iterations < MIN_PASSWORD_ITERATIONS {
            return Err(AuthError::Config(format!(
                "{PASSWORD_ITERATIONS} must be at least {MIN_PASSWORD_ITERATIONS}"
            )));
        }

        Ok(())
    }
}

/// `JWT:ValidIssuer` -> `JWT_VALIDISSUER`
pub fn env_var_name(key: &str) -> String {
    key.replace(':', "_").to_uppercase()
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> Result<T, AuthError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| AuthError::Config(format!("{key} has an invalid value: {v}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete() -> HashMap<String, String> {
        let secret = "s".repeat(32);
        source(&[
            (JWT_SECRET, secret.as_str()),
            (JWT_VALID_ISSUER, "blogapi"),
            (JWT_VALID_AUDIENCE, "blogapi-clients"),
        ])
    }

    #[test]
    fn test_config_defaults() {
        let values = complete();
        let config = AuthConfig::from_lookup(|k| values.get(k).cloned()).unwrap();

        assert_eq!(config.jwt_issuer, "blogapi");
        assert_eq!(config.jwt_audience, "blogapi-clients");
        assert_eq!(config.access_token_expiration, 3600);
        assert_eq!(config.password_iterations, 10_000);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let mut values = complete();
        values.remove(JWT_SECRET);

        let err = AuthConfig::from_lookup(|k| values.get(k).cloned()).unwrap_err();
        assert_eq!(err, AuthError::Config("JWT:Secret must be set".into()));
    }

    #[test]
    fn test_blank_audience_is_config_error() {
        let mut values = complete();
        values.insert(JWT_VALID_AUDIENCE.into(), "  ".into());

        let err = AuthConfig::from_lookup(|k| values.get(k).cloned()).unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
    }

    #[test]
    fn test_config_validation_short_secret() {
        let mut values = complete();
        values.insert(JWT_SECRET.into(), "short".into());

        assert!(AuthConfig::from_lookup(|k| values.get(k).cloned()).is_err());
    }

    #[test]
    fn test_iterations_floor() {
        let mut values = complete();
        values.insert(PASSWORD_ITERATIONS.into(), "1000".into());
        assert!(AuthConfig::from_lookup(|k| values.get(k).cloned()).is_err());

        values.insert(PASSWORD_ITERATIONS.into(), "20000".into());
        let config = AuthConfig::from_lookup(|k| values.get(k).cloned()).unwrap();
        assert_eq!(config.password_iterations, 20_000);
    }

    #[test]
    fn test_unparsable_expiration() {
        let mut values = complete();
        values.insert(JWT_ACCESS_EXPIRATION.into(), "one hour".into());

        let err = AuthConfig::from_lookup(|k| values.get(k).cloned()).unwrap_err();
        assert!(matches!(err, AuthError::Config(msg) if msg.contains("JWT:AccessExpiration")));
    }

    #[test]
    fn test_expiration_bounds() {
        let mut values = complete();
        values.insert(JWT_ACCESS_EXPIRATION.into(), i64::MAX.to_string());
        let err = AuthConfig::from_lookup(|k| values.get(k).cloned()).unwrap_err();
        assert!(matches!(err, AuthError::Config(msg) if msg.contains("at most")));

        values.insert(JWT_ACCESS_EXPIRATION.into(), "0".into());
        assert!(AuthConfig::from_lookup(|k| values.get(k).cloned()).is_err());

        values.insert(JWT_ACCESS_EXPIRATION.into(), MAX_ACCESS_EXPIRATION.to_string());
        let config = AuthConfig::from_lookup(|k| values.get(k).cloned()).unwrap();
        assert_eq!(config.access_token_expiration, MAX_ACCESS_EXPIRATION);
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name(JWT_SECRET), "JWT_SECRET");
        assert_eq!(env_var_name(JWT_VALID_ISSUER), "JWT_VALIDISSUER");
        assert_eq!(env_var_name(PASSWORD_ITERATIONS), "PASSWORD_ITERATIONS");
    }
}
