//! Authentication Service
//!
//! Registration and login on top of the credential manager, the token
//! issuer and a user store.

use crate::config::AuthConfig;
use crate::credentials::{CredentialManager, SALT_LEN};
use crate::crypto::{CryptoPrimitives, DefaultCrypto};
use crate::error::AuthError;
use crate::models::*;
use crate::store::UserStore;
use crate::token::TokenIssuer;

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Salt for the throwaway derivation run when a username is unknown
const UNKNOWN_USER_SALT: [u8; SALT_LEN] = [0u8; SALT_LEN];

/// Authentication service
pub struct AuthService {
    store: Arc<dyn UserStore>,
    credentials: CredentialManager,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(store: Arc<dyn UserStore>, config: AuthConfig) -> Result<Self, AuthError> {
        Self::with_crypto(store, config, Arc::new(DefaultCrypto))
    }

    /// Create a service with explicit crypto primitives
    pub fn with_crypto(
        store: Arc<dyn UserStore>,
        config: AuthConfig,
        crypto: Arc<dyn CryptoPrimitives>,
    ) -> Result<Self, AuthError> {
        config.validate()?;

        let credentials = CredentialManager::new(crypto.clone(), config.password_iterations);
        let tokens = TokenIssuer::new(&config, crypto)?;

        Ok(Self {
            store,
            credentials,
            tokens,
        })
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    // ============================================
    // User Registration
    // ============================================

    /// Register a new user
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthOutcome, AuthError> {
        self.register_cancellable(req, &CancellationToken::new())
            .await
    }

    /// Register a new user, aborting store I/O when `cancel` fires.
    ///
    /// Hashing is never interrupted; if cancellation is observed after it
    /// finishes, nothing is written.
    pub async fn register_cancellable(
        &self,
        req: RegisterRequest,
        cancel: &CancellationToken,
    ) -> Result<AuthOutcome, AuthError> {
        let existing = guarded(cancel, self.store.find_by_username(&req.username)).await?;
        if existing.is_some() {
            tracing::debug!(username = %req.username, "Registration rejected, username taken");
            return Ok(AuthOutcome::failure(MSG_USERNAME_EXISTS));
        }

        let credentials = self.credentials.clone();
        let password = req.password;
        let stored = tokio::task::spawn_blocking(move || credentials.hash_password(&password))
            .await
            .map_err(|e| {
                tracing::error!("Password hashing task failed: {:?}", e);
                AuthError::Internal
            })?;

        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled);
        }

        let user = NewUser {
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_hash: stored.password_hash,
            password_salt: stored.password_salt,
            created_at: Utc::now(),
        };

        match guarded(cancel, self.store.create_and_save(&user)).await {
            Ok(affected) if affected > 0 => {
                tracing::info!(username = %user.username, "User registered");
                Ok(AuthOutcome::success(MSG_USER_CREATED))
            }
            Ok(_) => {
                tracing::warn!(username = %user.username, "User insert affected no rows");
                Ok(AuthOutcome::failure(MSG_SAVE_FAILED))
            }
            Err(AuthError::UsernameExists) => {
                tracing::warn!(username = %user.username, "Concurrent registration lost the username race");
                Ok(AuthOutcome::failure(MSG_USERNAME_EXISTS))
            }
            Err(AuthError::EmailExists) => {
                tracing::debug!(username = %user.username, "Registration rejected, email taken");
                Ok(AuthOutcome::failure(MSG_EMAIL_EXISTS))
            }
            Err(e) => Err(e),
        }
    }

    // ============================================
    // Login
    // ============================================

    /// Verify credentials and issue an access token
    pub async fn login(&self, req: LoginRequest) -> Result<AuthOutcome, AuthError> {
        self.login_cancellable(req, &CancellationToken::new()).await
    }

    /// Login, aborting store I/O when `cancel` fires
    pub async fn login_cancellable(
        &self,
        req: LoginRequest,
        cancel: &CancellationToken,
    ) -> Result<AuthOutcome, AuthError> {
        let found = guarded(cancel, self.store.find_by_username(&req.username)).await?;

        let credentials = self.credentials.clone();
        let password = req.password;

        // Unknown usernames pay for one derivation too
        let Some(user) = found else {
            tokio::task::spawn_blocking(move || credentials.derive_hash(&password, &UNKNOWN_USER_SALT))
                .await
                .map_err(|e| {
                    tracing::error!("Password verification task failed: {:?}", e);
                    AuthError::Internal
                })?;
            tracing::debug!(username = %req.username, "Login rejected");
            return Ok(AuthOutcome::failure(MSG_INVALID_CREDENTIALS));
        };

        let (password_hash, password_salt) = (user.password_hash.clone(), user.password_salt.clone());
        let verified = tokio::task::spawn_blocking(move || {
            credentials.verify_stored(&password, &password_hash, &password_salt)
        })
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {:?}", e);
            AuthError::Internal
        })??;

        if !verified {
            tracing::debug!(username = %req.username, "Login rejected");
            return Ok(AuthOutcome::failure(MSG_INVALID_CREDENTIALS));
        }

        let claims = self.tokens.build_claims(&user);
        let token = self.tokens.issue(&claims)?;

        tracing::info!(user_id = user.id, username = %user.username, "User logged in");
        Ok(AuthOutcome::success(token))
    }
}

/// Run a store call unless `cancel` fires first
async fn guarded<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AuthError::Cancelled),
        res = fut => res,
    }
}
