use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CreateTaskRequest, UpdateTaskRequest},
    services::TaskService,
    validation::parse_id,
};

/// Retrieves all tasks of the authenticated user, ordered by id.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing, invalid or expired token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = tasks.list_tasks(user.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: at least 3 characters.
/// - `description` (optional, nullable).
///
/// ## Responses:
/// - `201 Created`: `{ "task": Task }`.
/// - `400 Bad Request`: invalid body.
/// - `401 Unauthorized`: missing, invalid or expired token.
/// - `404 Not Found`: the token's user no longer exists.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<CreateTaskRequest>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks
        .create_task(user.id, &task_data.title, task_data.description.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(json!({ "task": task })))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `400 Bad Request`: the id is not a number.
/// - `404 Not Found`: no such task among the caller's tasks.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&task_id)?;
    let task = tasks.get_task(id, user.id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Applies a partial update (`title`, `description`, `isCompleted`).
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: bad id or invalid body.
/// - `404 Not Found`: no such task among the caller's tasks.
#[patch("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
    task_data: web::Json<UpdateTaskRequest>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&task_id)?;
    task_data.validate()?;

    let task = tasks
        .update_task(user.id, id, task_data.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `400 Bad Request`: the id is not a number.
/// - `404 Not Found`: no such task among the caller's tasks.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&task_id)?;

    if !tasks.delete_task(id, user.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
