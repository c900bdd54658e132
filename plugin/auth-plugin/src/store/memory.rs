use super::UserStore;
use crate::error::AuthError;
use crate::models::{NewUser, UserIdentity};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Process-local user store.
///
/// The uniqueness check and the insert happen under one write lock, so
/// concurrent registrations of the same username cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, UserIdentity>,
    emails: HashSet<String>,
    next_id: i64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains_username(&self, username: &str) -> bool {
        self.inner.read().await.users.contains_key(username)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, AuthError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(username).cloned())
    }

    async fn create_and_save(&self, user: &NewUser) -> Result<u64, AuthError> {
        let mut inner = self.inner.write().await;

        if inner.users.contains_key(&user.username) {
            return Err(AuthError::UsernameExists);
        }
        if inner.emails.contains(&user.email) {
            return Err(AuthError::EmailExists);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.emails.insert(user.email.clone());
        inner
            .users
            .insert(user.username.clone(), user.clone().into_identity(id));
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: email.into(),
            password_hash: "hash".into(),
            password_salt: "salt".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryUserStore::new();
        assert_eq!(store.create_and_save(&new_user("alice", "a@x.com")).await, Ok(1));
        assert_eq!(store.create_and_save(&new_user("bob", "b@x.com")).await, Ok(1));

        let alice = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.id, 1);
        assert!(alice.created_at.is_some());
        assert_eq!(store.find_by_username("bob").await.unwrap().unwrap().id, 2);
        assert_eq!(store.find_by_username("carol").await, Ok(None));
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = InMemoryUserStore::new();
        store.create_and_save(&new_user("alice", "a@x.com")).await.unwrap();

        assert_eq!(
            store.create_and_save(&new_user("alice", "other@x.com")).await,
            Err(AuthError::UsernameExists)
        );
        assert_eq!(
            store.create_and_save(&new_user("alicia", "a@x.com")).await,
            Err(AuthError::EmailExists)
        );
        assert_eq!(store.len().await, 1);
        assert!(store.contains_username("alice").await);
        assert!(!store.contains_username("alicia").await);
    }

    #[tokio::test]
    async fn test_username_lookup_is_exact() {
        let store = InMemoryUserStore::new();
        store.create_and_save(&new_user("alice", "a@x.com")).await.unwrap();

        assert_eq!(store.find_by_username("Alice").await, Ok(None));
    }
}
