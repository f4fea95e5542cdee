//! Titan user service
//!
//! Create, look up, list, partially update and soft-delete user records,
//! backed by PostgreSQL (writer and optional reader pool) or an in-memory
//! store, and served over HTTP.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, UserServiceTrait};
use infrastructure::storage::{run_user_migrations, PostgresPools, StorageType};
use infrastructure::user::{InMemoryUserRepository, PostgresUserRepository, UserService};
use tracing::info;

/// Create the application state for the configured storage backend
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let backend: StorageType = config.storage.backend.parse()?;
    info!(%backend, "Storage backend selected");

    let user_service: Arc<dyn UserServiceTrait> = match backend {
        StorageType::InMemory => {
            Arc::new(UserService::new(Arc::new(InMemoryUserRepository::new())))
        }
        StorageType::Postgres => {
            let pools = PostgresPools::connect(&config.database).await?;

            if config.database.run_migrations {
                run_user_migrations(&pools.writer).await?;
            }

            let repository = PostgresUserRepository::new(pools.writer, pools.reader);
            Arc::new(UserService::new(Arc::new(repository)))
        }
    };

    Ok(AppState::new(user_service))
}

/// Application state over a fresh in-memory store
pub fn create_in_memory_app_state() -> AppState {
    AppState::new(Arc::new(UserService::new(Arc::new(
        InMemoryUserRepository::new(),
    ))))
}
