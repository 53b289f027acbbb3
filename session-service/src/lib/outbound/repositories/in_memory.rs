use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

struct StoredUser {
    user: User,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredUser {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Process-local user store with the same contract as the Postgres adapter.
///
/// Deletes are soft, so a deleted email can be registered again.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, StoredUser>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|stored| stored.is_live() && stored.user.email == user.email)
        {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                deleted_at: None,
            },
        );

        Ok(user)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<User, UserError> {
        self.users
            .read()
            .await
            .values()
            .find(|stored| stored.is_live() && &stored.user.email == email)
            .map(|stored| stored.user.clone())
            .ok_or_else(|| UserError::NotFound(email.to_string()))
    }

    async fn delete(&self, user: &User) -> Result<(), UserError> {
        let mut users = self.users.write().await;

        match users.get_mut(&user.id) {
            Some(stored) if stored.is_live() => {
                let now = Utc::now();
                stored.deleted_at = Some(now);
                stored.user.updated_at = now;
                Ok(())
            }
            _ => Err(UserError::NotFound(user.id.to_string())),
        }
    }
}
