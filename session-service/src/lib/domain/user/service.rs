use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::IssuedToken;
use chrono::Utc;
use tokio::sync::OnceCell;
use tokio::task::JoinError;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

// Hashed once on first use; unknown-email logins verify against it.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Domain service implementation for user and session operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    decoy_digest: OnceCell<String>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password codec and token issuer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
            decoy_digest: OnceCell::new(),
        }
    }

    // Argon2 blocks for tens of milliseconds; keep it off the async workers.
    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await
            .map_err(join_error)?
            .map_err(UserError::from)
    }

    async fn authenticate(&self, user: &User, password: Password) -> Result<IssuedToken, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        let digest = user.password_digest.clone();
        let user_id = user.id;
        let email = user.email.as_str().to_string();
        let name = user.name.as_str().to_string();

        let issued = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.expose(), &digest, user_id, &email, &name)
        })
        .await
        .map_err(join_error)??;

        Ok(issued)
    }

    /// Spend the same Argon2 work as a real login, then discard the outcome.
    async fn verify_decoy(&self, password: Password) -> Result<(), UserError> {
        let digest = self
            .decoy_digest
            .get_or_try_init(|| async {
                self.hash_password(Password::new(DECOY_PASSWORD.to_string())?)
                    .await
            })
            .await?
            .clone();
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || {
            let _ = authenticator.verify_password(password.expose(), &digest);
        })
        .await
        .map_err(join_error)
    }

    async fn find_session_user(
        &self,
        user_id: &UserId,
        email: &EmailAddress,
    ) -> Result<User, UserError> {
        let user = self.repository.find_by_email(email).await?;

        if user.id != *user_id {
            tracing::warn!(
                user_id = %user_id,
                owner_id = %user.id,
                "Session user no longer owns email"
            );
            return Err(UserError::NotFound(email.to_string()));
        }

        Ok(user)
    }

    fn issue_token(&self, user: &User) -> Result<IssuedToken, UserError> {
        self.authenticator
            .issue_token(user.id, user.email.as_str(), user.name.as_str())
            .map_err(UserError::from)
    }
}

fn join_error(e: JoinError) -> UserError {
    UserError::Unknown(format!("Blocking task failed: {}", e))
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError> {
        let password_digest = self.hash_password(command.password).await?;
        let now = Utc::now();

        let user = User {
            id: UserId::new(),
            email: command.email,
            name: command.name,
            password_digest,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, UserError> {
        let user = match self.repository.find_by_email(&command.email).await {
            Ok(user) => user,
            Err(UserError::NotFound(_)) => {
                self.verify_decoy(command.password).await?;
                tracing::info!("Login rejected: unknown email");
                return Err(UserError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let token = self
            .authenticate(&user, command.password)
            .await
            .inspect_err(|e| {
                if matches!(e, UserError::InvalidCredentials) {
                    tracing::info!(user_id = %user.id, "Login rejected: wrong password");
                }
            })?;
        tracing::info!(user_id = %user.id, expires_at = %token.expires_at, "Session issued");

        Ok(Session { user, token })
    }

    async fn current_user(
        &self,
        user_id: &UserId,
        email: &EmailAddress,
    ) -> Result<User, UserError> {
        self.find_session_user(user_id, email).await
    }

    async fn delete_user(&self, user_id: &UserId, email: &EmailAddress) -> Result<(), UserError> {
        let user = self.find_session_user(user_id, email).await?;
        self.repository.delete(&user).await?;
        tracing::info!(user_id = %user.id, "User deleted");

        Ok(())
    }

    async fn refresh_session(
        &self,
        user_id: &UserId,
        email: &EmailAddress,
    ) -> Result<Session, UserError> {
        let user = self.find_session_user(user_id, email).await?;
        let token = self.issue_token(&user)?;
        tracing::debug!(user_id = %user.id, expires_at = %token.expires_at, "Session refreshed");

        Ok(Session { user, token })
    }
}
