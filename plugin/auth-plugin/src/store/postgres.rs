use super::UserStore;
use crate::error::AuthError;
use crate::models::{NewUser, UserIdentity};

use async_trait::async_trait;
use sqlx::PgPool;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// PostgreSQL-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the users table if it does not exist
    pub async fn migrate(&self) -> Result<(), AuthError> {
        tracing::info!("Running authentication database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(50) NOT NULL,
                first_name VARCHAR(50) NOT NULL,
                last_name VARCHAR(50) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(128) NOT NULL,
                password_salt VARCHAR(64) NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                CONSTRAINT users_username_key UNIQUE (username),
                CONSTRAINT users_email_key UNIQUE (email)
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        tracing::info!("Authentication migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, AuthError> {
        let user = sqlx::query_as::<_, UserIdentity>(
            r#"
            SELECT id, username, first_name, last_name, email, password_hash, password_salt, created_at
            FROM users WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn create_and_save(&self, user: &NewUser) -> Result<u64, AuthError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, first_name, last_name, email, password_hash, password_salt, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(user.created_at)
        .execute(&self.db)
        .await
        .map_err(map_unique_violation)?;

        Ok(result.rows_affected())
    }
}

fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(EMAIL_CONSTRAINT) => AuthError::EmailExists,
                Some(USERNAME_CONSTRAINT) | None => AuthError::UsernameExists,
                Some(other) => {
                    tracing::warn!(constraint = other, "Unexpected unique constraint on users");
                    AuthError::UsernameExists
                }
            };
        }
    }
    AuthError::from(err)
}
