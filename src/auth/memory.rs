use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::errors::StoreError;
use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User};

/// Process-local store keyed by email. The mutex is held only inside a
/// single lookup or insert, which makes insert an atomic check-and-write.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("user map lock poisoned".into())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.get(email).cloned())
    }

    async fn insert(&self, new_user: NewUser<'_>) -> Result<User, StoreError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        if users.contains_key(new_user.email) {
            return Err(StoreError::ConstraintViolation("users_email_key".into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.to_string(),
            email: new_user.email.to_string(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::dto::Role;
    use crate::auth::password::HashedCredential;

    #[tokio::test]
    async fn insert_assigns_id_and_rejects_duplicates() {
        let store = InMemoryUserStore::new();
        let hash = HashedCredential::new("$argon2id$stub");
        let new_user = NewUser {
            name: "Alice",
            email: "alice@x.com",
            password_hash: &hash,
            role: Role::User,
        };

        let created = store.insert(new_user).await.expect("first insert");
        assert_eq!(created.email, "alice@x.com");

        let err = store.insert(new_user).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
        assert_eq!(store.len(), 1);

        let found = store.find_by_email("alice@x.com").await.unwrap().expect("present");
        assert_eq!(found.id, created.id);
        assert!(store.find_by_email("bob@x.com").await.unwrap().is_none());
    }
}
