use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

use crate::{
    auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::AppError,
    services::AuthService,
};

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: the new user's public view (no password field).
/// - `400 Bad Request`: the body is not valid JSON or fails validation.
/// - `409 Conflict`: the email or username is already in use.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = auth
        .register(
            &register_data.username,
            &register_data.email,
            &register_data.password,
        )
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{ "token": "<jwt>" }`, valid for one hour.
/// - `400 Bad Request`: the body is not valid JSON or fails validation.
/// - `401 Unauthorized`: unknown username or wrong password.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let token = auth
        .login(&login_data.username, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}
