//! Storage infrastructure - backend selection, PostgreSQL pools and migrations

mod backend;
pub mod migrations;
mod postgres;

pub use backend::StorageType;
pub use migrations::{run_user_migrations, user_migrations, Migration, PostgresMigrator};
pub use postgres::{PostgresConfig, PostgresPools};
