use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};

use taskvault::auth::TokenKeys;
use taskvault::config::{Config, StorageBackend};
use taskvault::store::{MemoryStore, PgStore};
use taskvault::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let keys = TokenKeys::from_secret(config.jwt_secret.as_bytes());
    let state = match config.storage {
        StorageBackend::Postgres => {
            let store = connect_postgres(&config).await?;
            let store = Arc::new(store);
            AppState::new(store.clone(), store, keys, config.bcrypt_cost)
        }
        StorageBackend::Memory => {
            log::warn!("using in-memory storage; data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            AppState::new(store.clone(), store, keys, config.bcrypt_cost)
        }
    };

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind(config.bind_address())?
    .run()
    .await
}

async fn connect_postgres(config: &Config) -> std::io::Result<PgStore> {
    let to_io = |e: &dyn std::fmt::Display| std::io::Error::new(std::io::ErrorKind::Other, e.to_string());

    let options = config.connect_options().map_err(|e| to_io(&e))?;
    let store = PgStore::connect(options, config.max_connections)
        .await
        .map_err(|e| {
            log::error!("failed to connect to database: {}", e);
            to_io(&e)
        })?;
    store.migrate().await.map_err(|e| {
        log::error!("failed to run migrations: {}", e);
        to_io(&e)
    })?;
    log::info!("database ready, migrations applied");
    Ok(store)
}
