use std::sync::Arc;

use crate::error::AppError;
use crate::models::{PublicUser, UserChanges};
use crate::store::UserStore;

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

/// User directory operations. Results are always public views.
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn list_users(&self) -> Result<Vec<PublicUser>, AppError> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn get_user(&self, id: i32) -> Result<PublicUser, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .map(PublicUser::from)
            .ok_or_else(user_not_found)
    }

    /// Applies the supplied fields. A username or email already held by a
    /// different user is a conflict; re-submitting one's own value is not.
    pub async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<PublicUser, AppError> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(user_not_found());
        }

        if let Some(username) = changes.username.as_deref() {
            if let Some(holder) = self.users.find_by_username(username).await? {
                if holder.id != id {
                    return Err(AppError::Conflict("Username already in use".into()));
                }
            }
        }
        if let Some(email) = changes.email.as_deref() {
            if let Some(holder) = self.users.find_by_email(email).await? {
                if holder.id != id {
                    return Err(AppError::Conflict("Email already in use".into()));
                }
            }
        }

        self.users
            .update(id, changes)
            .await?
            .map(PublicUser::from)
            .ok_or_else(user_not_found)
    }

    /// Returns whether a user was deleted. Their tasks go with them.
    pub async fn delete_user(&self, id: i32) -> Result<bool, AppError> {
        let deleted = self.users.delete(id).await?;
        if deleted {
            log::info!("deleted user {}", id);
        }
        Ok(deleted)
    }
}
