//! Blog API Authentication
//!
//! Credential authentication for the Blog API:
//! - User registration with salted PBKDF2-HMAC-SHA256 password hashing
//! - Login with constant-time credential verification
//! - HS256 JWT access tokens carrying the user's identity claims
//! - A bearer-token guard for protected routes
//!
//! # Configuration
//!
//! Keys are read from an opaque source (see [`AuthConfig::from_lookup`]) or
//! from the environment:
//! - `JWT:Secret` / `JWT_SECRET` - HMAC signing secret (required, min 32 chars)
//! - `JWT:ValidIssuer` / `JWT_VALIDISSUER` - issuer claim (required)
//! - `JWT:ValidAudience` / `JWT_VALIDAUDIENCE` - audience claim (required)
//! - `JWT:AccessExpiration` / `JWT_ACCESSEXPIRATION` - token lifetime in seconds (default: 3600)
//! - `Password:Iterations` / `PASSWORD_ITERATIONS` - PBKDF2 iterations (default and minimum: 10000)
//!
//! # Usage
//!
//! ```rust,ignore
//! use blogapi_auth::{AuthPlugin, Plugin};
//!
//! let plugin = AuthPlugin::new();
//! plugin.activate(db_pool).await?;
//!
//! let auth = plugin.auth_service().await.unwrap();
//! let outcome = auth.login(LoginRequest::new("alice", "P@ssw0rd123")).await?;
//! if outcome.is_succeed {
//!     let token = outcome.message;
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod service;
pub mod store;
pub mod token;

pub use config::AuthConfig;
pub use credentials::CredentialManager;
pub use crypto::{CryptoPrimitives, DefaultCrypto};
pub use error::AuthError;
pub use extractors::AuthUser;
pub use handlers::AuthState;
pub use models::*;
pub use service::AuthService;
pub use store::{InMemoryUserStore, PgUserStore, UserStore};
pub use token::{AccessTokenClaims, ClaimSet, ClaimType, TokenIssuer};

use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================
// Plugin Types
// ============================================

/// Plugin state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Inactive,
    Active,
    Error,
}

/// Plugin metadata
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Plugin lifecycle trait
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Get plugin information
    fn info(&self) -> &PluginInfo;

    /// Get current plugin state
    async fn state(&self) -> PluginState;

    /// Activate the plugin
    async fn activate(&self, db: PgPool) -> Result<(), AuthError>;

    /// Deactivate the plugin
    async fn deactivate(&self) -> Result<(), AuthError>;

    /// Get plugin routes, if active
    fn routes(&self) -> Option<Router>;
}

// ============================================
// Auth Plugin Implementation
// ============================================

pub struct AuthPlugin {
    info: PluginInfo,
    state: RwLock<PluginState>,
    auth_service: RwLock<Option<Arc<AuthService>>>,
}

impl AuthPlugin {
    /// Create a new auth plugin instance
    pub fn new() -> Self {
        Self {
            info: PluginInfo {
                id: "blogapi-auth".into(),
                name: "Blog API Authentication".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                description: "Registration, login and access tokens for the Blog API".into(),
            },
            state: RwLock::new(PluginState::Inactive),
            auth_service: RwLock::new(None),
        }
    }

    /// Get the authentication service
    pub async fn auth_service(&self) -> Option<Arc<AuthService>> {
        self.auth_service.read().await.clone()
    }

    /// Activate against any user store with an explicit configuration
    pub async fn activate_with(
        &self,
        store: Arc<dyn UserStore>,
        config: AuthConfig,
    ) -> Result<(), AuthError> {
        let auth_service = match AuthService::new(store, config) {
            Ok(service) => Arc::new(service),
            Err(e) => {
                tracing::error!(error = %e, "Authentication plugin failed to activate");
                *self.state.write().await = PluginState::Error;
                return Err(e);
            }
        };

        *self.auth_service.write().await = Some(auth_service);
        *self.state.write().await = PluginState::Active;

        tracing::info!("Blog API Authentication plugin activated successfully");
        Ok(())
    }
}

impl Default for AuthPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for AuthPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    async fn state(&self) -> PluginState {
        *self.state.read().await
    }

    async fn activate(&self, db: PgPool) -> Result<(), AuthError> {
        tracing::info!("Activating Blog API Authentication plugin");

        let config = match AuthConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                *self.state.write().await = PluginState::Error;
                return Err(e);
            }
        };

        let store = PgUserStore::new(db);
        store.migrate().await?;

        self.activate_with(Arc::new(store), config).await
    }

    async fn deactivate(&self) -> Result<(), AuthError> {
        tracing::info!("Deactivating Blog API Authentication plugin");

        *self.auth_service.write().await = None;
        *self.state.write().await = PluginState::Inactive;

        tracing::info!("Blog API Authentication plugin deactivated");
        Ok(())
    }

    fn routes(&self) -> Option<Router> {
        let service = self.auth_service.try_read().ok()?.clone()?;
        Some(create_routes(service))
    }
}

/// Create authentication routes
pub fn create_routes(auth_service: Arc<AuthService>) -> Router {
    handlers::create_routes(auth_service)
}

// ============================================
// Module Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "a".repeat(32),
            jwt_issuer: "blogapi".to_string(),
            jwt_audience: "blogapi-clients".to_string(),
            access_token_expiration: 3600,
            password_iterations: 10_000,
        }
    }

    #[test]
    fn test_plugin_info() {
        let plugin = AuthPlugin::new();
        assert_eq!(plugin.info().id, "blogapi-auth");
        assert_eq!(plugin.info().name, "Blog API Authentication");
    }

    #[tokio::test]
    async fn test_plugin_initial_state() {
        let plugin = AuthPlugin::new();
        assert_eq!(plugin.state().await, PluginState::Inactive);
        assert!(plugin.routes().is_none());
    }

    #[tokio::test]
    async fn test_plugin_lifecycle() {
        let plugin = AuthPlugin::new();
        plugin
            .activate_with(Arc::new(InMemoryUserStore::new()), config())
            .await
            .unwrap();

        assert_eq!(plugin.state().await, PluginState::Active);
        assert!(plugin.auth_service().await.is_some());
        assert!(plugin.routes().is_some());

        plugin.deactivate().await.unwrap();
        assert_eq!(plugin.state().await, PluginState::Inactive);
        assert!(plugin.auth_service().await.is_none());
    }

    #[tokio::test]
    async fn test_plugin_bad_config_sets_error_state() {
        let plugin = AuthPlugin::new();
        let mut bad = config();
        bad.password_iterations = 1;

        let result = plugin
            .activate_with(Arc::new(InMemoryUserStore::new()), bad)
            .await;

        assert!(matches!(result, Err(AuthError::Config(_))));
        assert_eq!(plugin.state().await, PluginState::Error);
    }
}
