//! In-memory user store.
//!
//! Backs the unit tests and local experiments with the same contract as the
//! Postgres store, including uniqueness of emails and token hashes.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreError, User, UserLookup, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.values().any(|user| user.email == email) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            session_hash: None,
            reset_token_hash: None,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        let found = match lookup {
            UserLookup::ByEmail(email) => users.values().find(|user| user.email == email),
            UserLookup::ById(id) => users.get(&id),
            UserLookup::BySessionHash(hash) => users
                .values()
                .find(|user| user.session_hash.as_deref() == Some(hash)),
            UserLookup::ByResetTokenHash(hash) => users
                .values()
                .find(|user| user.reset_token_hash.as_deref() == Some(hash)),
        };
        Ok(found.cloned())
    }

    async fn set_session_hash(
        &self,
        user_id: Uuid,
        session_hash: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if let Some(hash) = session_hash {
            let taken = users
                .values()
                .any(|user| user.id != user_id && user.session_hash.as_deref() == Some(hash));
            if taken {
                return Err(StoreError::Duplicate);
            }
        }
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.session_hash = session_hash.map(<[u8]>::to_vec);
        Ok(())
    }

    async fn set_reset_token_hash(
        &self,
        user_id: Uuid,
        reset_token_hash: &[u8],
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        let taken = users.values().any(|user| {
            user.id != user_id && user.reset_token_hash.as_deref() == Some(reset_token_hash)
        });
        if taken {
            return Err(StoreError::Duplicate);
        }
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.reset_token_hash = Some(reset_token_hash.to_vec());
        Ok(())
    }

    async fn replace_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.reset_token_hash = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        store.create_user("a@example.com", "hash").await.unwrap();
        let second = store.create_user("a@example.com", "other").await;
        assert!(matches!(second, Err(StoreError::Duplicate)));
    }

    #[tokio::test]
    async fn find_by_each_key() {
        let store = MemoryUserStore::new();
        let user = store.create_user("a@example.com", "hash").await.unwrap();
        store
            .set_session_hash(user.id, Some(b"session"))
            .await
            .unwrap();
        store.set_reset_token_hash(user.id, b"reset").await.unwrap();

        let by_email = store
            .find_user(UserLookup::ByEmail("a@example.com"))
            .await
            .unwrap();
        assert_eq!(by_email.as_ref().map(|u| u.id), Some(user.id));

        let by_id = store.find_user(UserLookup::ById(user.id)).await.unwrap();
        assert_eq!(by_id.as_ref().map(|u| u.id), Some(user.id));

        let by_session = store
            .find_user(UserLookup::BySessionHash(b"session"))
            .await
            .unwrap();
        assert_eq!(by_session.as_ref().map(|u| u.id), Some(user.id));

        let by_reset = store
            .find_user(UserLookup::ByResetTokenHash(b"reset"))
            .await
            .unwrap();
        assert_eq!(by_reset.as_ref().map(|u| u.id), Some(user.id));

        let miss = store
            .find_user(UserLookup::ByEmail("b@example.com"))
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn updates_require_existing_user() {
        let store = MemoryUserStore::new();
        let missing = Uuid::new_v4();
        assert!(matches!(
            store.set_session_hash(missing, None).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.set_reset_token_hash(missing, b"t").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.replace_password(missing, "hash").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn session_hash_unique_across_users() {
        let store = MemoryUserStore::new();
        let alice = store.create_user("a@example.com", "hash").await.unwrap();
        let bob = store.create_user("b@example.com", "hash").await.unwrap();
        store
            .set_session_hash(alice.id, Some(b"token"))
            .await
            .unwrap();
        let clash = store.set_session_hash(bob.id, Some(b"token")).await;
        assert!(matches!(clash, Err(StoreError::Duplicate)));
    }

    #[tokio::test]
    async fn replace_password_clears_reset_token() {
        let store = MemoryUserStore::new();
        let user = store.create_user("a@example.com", "hash").await.unwrap();
        store.set_reset_token_hash(user.id, b"reset").await.unwrap();
        store.replace_password(user.id, "new-hash").await.unwrap();

        let updated = store
            .find_user(UserLookup::ById(user.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.password_hash, "new-hash");
        assert!(updated.reset_token_hash.is_none());
    }
}
