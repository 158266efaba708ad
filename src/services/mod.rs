//! Business operations behind the HTTP handlers.
//!
//! Each service is constructed once at startup with the store handles it needs
//! and shared across workers through `web::Data`.

pub mod auth;
pub mod tasks;
pub mod users;

pub use auth::AuthService;
pub use tasks::TaskService;
pub use users::UserService;
