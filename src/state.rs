use std::sync::Arc;

use actix_web::web;

use crate::auth::TokenKeys;
use crate::routes;
use crate::services::{AuthService, TaskService, UserService};
use crate::store::{MemoryStore, TaskStore, UserStore};
use crate::validation;

/// Everything the handlers need, built once and cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub users: web::Data<UserService>,
    pub tasks: web::Data<TaskService>,
    pub keys: web::Data<TokenKeys>,
}

impl AppState {
    pub fn new(
        user_store: Arc<dyn UserStore>,
        task_store: Arc<dyn TaskStore>,
        keys: TokenKeys,
        hash_cost: u32,
    ) -> Self {
        Self {
            auth: web::Data::new(AuthService::new(
                user_store.clone(),
                keys.clone(),
                hash_cost,
            )),
            users: web::Data::new(UserService::new(user_store.clone())),
            tasks: web::Data::new(TaskService::new(task_store, user_store)),
            keys: web::Data::new(keys),
        }
    }

    /// State over a fresh [`MemoryStore`].
    pub fn in_memory(keys: TokenKeys, hash_cost: u32) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, keys, hash_cost)
    }

    /// Registers app data, the JSON body error handler and all routes.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.users.clone())
            .app_data(self.tasks.clone())
            .app_data(self.keys.clone())
            .app_data(validation::json_config())
            .configure(routes::config);
    }
}
