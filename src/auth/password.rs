use actix_web::web;
use bcrypt::{hash, verify};

use crate::error::AppError;

/// Cost factor used when none is configured.
pub const DEFAULT_HASH_COST: u32 = 10;

/// Lowest cost bcrypt accepts. Also used by the tests to keep hashing fast.
pub const MIN_HASH_COST: u32 = 4;

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}

/// Runs [`hash_password`] on the blocking thread pool so bcrypt's work factor
/// does not stall the async worker.
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, AppError> {
    web::block(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// Blocking-pool counterpart of [`verify_password`].
pub async fn verify_password_blocking(
    password: String,
    hashed_password: String,
) -> Result<bool, AppError> {
    web::block(move || verify_password(&password, &hashed_password))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}
