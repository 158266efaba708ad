//! In-memory store with the same constraint semantics as the PostgreSQL schema:
//! unique usernames and emails, a foreign key from tasks to users, and cascade
//! deletion of a user's tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskChanges, User, UserChanges};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    tasks: BTreeMap<i32, Task>,
    last_user_id: i32,
    last_task_id: i32,
}

impl Tables {
    /// Emulates the `users_email_key` / `users_username_key` constraints.
    fn check_unique(
        &self,
        except_id: Option<i32>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), AppError> {
        let others = self
            .users
            .values()
            .filter(|user| Some(user.id) != except_id);
        for user in others {
            if email == Some(user.email.as_str()) {
                return Err(AppError::Conflict("Email already in use".into()));
            }
            if username == Some(user.username.as_str()) {
                return Err(AppError::Conflict("Username already in use".into()));
            }
        }
        Ok(())
    }
}

/// Thread-safe in-process implementation of [`UserStore`] and [`TaskStore`].
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_unique(None, Some(user.username.as_str()), Some(user.email.as_str()))?;

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if changes.is_empty() {
            return Ok(tables.users.get(&id).cloned());
        }
        tables.check_unique(
            Some(id),
            changes.username.as_deref(),
            changes.email.as_deref(),
        )?;

        let user = match tables.users.get_mut(&id) {
            Some(user) => user,
            None => return Ok(None),
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.tasks.retain(|_, task| task.owner_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&task.owner_id) {
            return Err(AppError::NotFound("User not found".into()));
        }

        tables.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.last_task_id,
            title: task.title,
            description: task.description,
            is_completed: false,
            owner_id: task.owner_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_scoped(&self, id: i32, owner_id: i32) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .get(&id)
            .filter(|task| task.owner_id == owner_id)
            .cloned())
    }

    async fn update_scoped(
        &self,
        id: i32,
        owner_id: i32,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut tables = self.tables.write().await;
        let task = match tables.tasks.get_mut(&id) {
            Some(task) if task.owner_id == owner_id => task,
            _ => return Ok(None),
        };
        if !changes.is_empty() {
            changes.apply_to(task);
            task.updated_at = Utc::now();
        }
        Ok(Some(task.clone()))
    }

    async fn delete_scoped(&self, id: i32, owner_id: i32) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .tasks
            .get(&id)
            .map_or(false, |task| task.owner_id == owner_id);
        if owned {
            tables.tasks.remove(&id);
        }
        Ok(owned)
    }
}
