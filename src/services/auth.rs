use std::sync::Arc;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::TokenKeys;
use crate::error::AppError;
use crate::models::{NewUser, PublicUser};
use crate::store::UserStore;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Registration and credential checks.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: TokenKeys,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: TokenKeys, hash_cost: u32) -> Self {
        Self {
            users,
            keys,
            hash_cost,
        }
    }

    /// Creates an account after checking that neither the email nor the
    /// username is taken (email first). The unique constraints of the store
    /// still decide races between concurrent registrations.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".into()));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already in use".into()));
        }

        let password_hash = hash_password_blocking(password.to_string(), self.hash_cost).await?;
        let user = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        log::info!("registered user {} ({})", user.id, user.username);
        Ok(user.into())
    }

    /// Verifies the credentials and returns a signed token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        let matches =
            verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !matches {
            log::debug!("failed login for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        self.keys.issue(&PublicUser::from(user))
    }
}
