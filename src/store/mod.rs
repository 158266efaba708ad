//! Persistence seams for users and tasks.
//!
//! Services only ever talk to `dyn UserStore` / `dyn TaskStore`, so the same
//! business logic runs against PostgreSQL in production and against the
//! in-memory tables in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskChanges, User, UserChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Credential store. `username` and `email` are unique across all users;
/// implementations report a violation as `AppError::Conflict`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Returns `None` when no user has this id.
    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError>;

    /// Deletes the user and, through the owner reference, all of their tasks.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

/// Task store. Apart from `insert`, every operation is scoped by the
/// `(task id, owner id)` pair; a task owned by someone else behaves exactly
/// like a task that does not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fails with `AppError::NotFound` if the owner does not exist.
    async fn insert(&self, task: NewTask) -> Result<Task, AppError>;

    /// All tasks of `owner_id` ordered by id.
    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError>;

    async fn find_scoped(&self, id: i32, owner_id: i32) -> Result<Option<Task>, AppError>;

    async fn update_scoped(
        &self,
        id: i32,
        owner_id: i32,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError>;

    async fn delete_scoped(&self, id: i32, owner_id: i32) -> Result<bool, AppError>;
}
