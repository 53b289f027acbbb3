use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user and session domain operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated email, password and display name
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - A live user already owns this email
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError>;

    /// Check a user's password and issue a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Password` - Stored digest is corrupt
    /// * `Token` - Signing failed
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<Session, UserError>;

    /// Look up the user behind an authenticated session.
    ///
    /// The live user owning `email` must also carry `user_id`; a token
    /// outlives neither its user nor a later owner of the same email.
    ///
    /// # Errors
    /// * `NotFound` - The session's user was deleted
    /// * `DatabaseError` - Database operation failed
    async fn current_user(&self, user_id: &UserId, email: &EmailAddress)
        -> Result<User, UserError>;

    /// Delete the user behind an authenticated session.
    ///
    /// # Errors
    /// * `NotFound` - The session's user is already gone
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, user_id: &UserId, email: &EmailAddress) -> Result<(), UserError>;

    /// Issue a new token for the user behind an authenticated session.
    ///
    /// # Errors
    /// * `NotFound` - The session's user was deleted
    /// * `Token` - Signing failed
    /// * `DatabaseError` - Database operation failed
    async fn refresh_session(
        &self,
        user_id: &UserId,
        email: &EmailAddress,
    ) -> Result<Session, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - A live user already owns this email
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve the live user owning an email address.
    ///
    /// # Errors
    /// * `NotFound` - No live user owns this email
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<User, UserError>;

    /// Soft-delete a user.
    ///
    /// Deleting a user that is already deleted is always `NotFound`.
    ///
    /// # Errors
    /// * `NotFound` - User is not live
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, user: &User) -> Result<(), UserError>;
}
