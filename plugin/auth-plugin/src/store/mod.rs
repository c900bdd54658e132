//! User Store
//!
//! The service only needs lookup by username and a single create call. The
//! store is the sole arbiter of uniqueness: an insert that collides with an
//! existing username or email must fail with [`AuthError::UsernameExists`]
//! or [`AuthError::EmailExists`].

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

use crate::error::AuthError;
use crate::models::{NewUser, UserIdentity};

use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, AuthError>;

    /// Insert and commit. Returns the affected row count.
    async fn create_and_save(&self, user: &NewUser) -> Result<u64, AuthError>;
}
