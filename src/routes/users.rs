use actix_web::{delete, get, patch, web, HttpResponse, Responder};
use validator::Validate;

use crate::{
    error::AppError, models::UpdateUserRequest, services::UserService, validation::parse_id,
};

/// Lists all users.
#[get("")]
pub async fn list_users(users: web::Data<UserService>) -> Result<impl Responder, AppError> {
    let users = users.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Retrieves one user by numeric id.
///
/// ## Responses:
/// - `200 OK`: the user's public view.
/// - `400 Bad Request`: the id is not a number.
/// - `404 Not Found`: no such user.
#[get("/{id}")]
pub async fn get_user(
    users: web::Data<UserService>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&user_id)?;
    let user = users.get_user(id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Partially updates a user's `username` and/or `email`.
///
/// ## Responses:
/// - `200 OK`: the updated public view.
/// - `400 Bad Request`: bad id, empty body or invalid fields.
/// - `404 Not Found`: no such user.
/// - `409 Conflict`: the new username or email belongs to another user.
#[patch("/{id}")]
pub async fn update_user(
    users: web::Data<UserService>,
    user_id: web::Path<String>,
    user_data: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&user_id)?;
    user_data.validate()?;

    let user = users.update_user(id, user_data.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Deletes a user together with all of their tasks.
///
/// ## Responses:
/// - `204 No Content`: the user was deleted.
/// - `400 Bad Request`: the id is not a number.
/// - `404 Not Found`: no such user.
#[delete("/{id}")]
pub async fn delete_user(
    users: web::Data<UserService>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_id(&user_id)?;

    if !users.delete_user(id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
