pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::validate_password_strength;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys};

/// Represents the payload for a user login request.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Must be at least 3 characters long.
    #[validate(length(min = 3))]
    pub username: String,
    /// Must not be empty.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    /// Desired username. At least 3 characters.
    #[validate(length(min = 3))]
    pub username: String,
    /// Email address for the new account.
    #[validate(email)]
    pub email: String,
    /// At least 8 characters with upper and lower case letters, a digit and a symbol.
    #[validate(length(min = 8), custom = "validate_password_strength")]
    pub password: String,
}

/// Response body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The signed JWT to present as `Authorization: Bearer <token>`.
    pub token: String,
}
