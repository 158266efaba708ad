#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "User registration and authentication plus per-user task management over a"]
#![doc = "relational store. Requests flow route -> token check -> validation -> service"]
#![doc = "-> store, and every failure is rendered by `error::AppError`."]
#![doc = "The binary (`main.rs`) wires configuration, storage and the HTTP server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;

pub use crate::error::AppError;
pub use crate::state::AppState;
