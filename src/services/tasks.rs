use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges};
use crate::store::{TaskStore, UserStore};

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Task operations, always scoped to the owning user.
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>) -> Self {
        Self { tasks, users }
    }

    pub async fn create_task(
        &self,
        owner_id: i32,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, AppError> {
        if self.users.find_by_id(owner_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }

        self.tasks
            .insert(NewTask {
                owner_id,
                title: title.to_string(),
                description: description
                    .filter(|description| !description.is_empty())
                    .map(str::to_string),
            })
            .await
    }

    pub async fn list_tasks(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        self.tasks.list_for_owner(owner_id).await
    }

    /// A task owned by someone else is reported exactly like a missing one.
    pub async fn get_task(&self, task_id: i32, owner_id: i32) -> Result<Task, AppError> {
        self.tasks
            .find_scoped(task_id, owner_id)
            .await?
            .ok_or_else(task_not_found)
    }

    pub async fn update_task(
        &self,
        owner_id: i32,
        task_id: i32,
        changes: TaskChanges,
    ) -> Result<Task, AppError> {
        self.tasks
            .update_scoped(task_id, owner_id, changes)
            .await?
            .ok_or_else(task_not_found)
    }

    pub async fn delete_task(&self, task_id: i32, owner_id: i32) -> Result<bool, AppError> {
        self.tasks.delete_scoped(task_id, owner_id).await
    }
}
