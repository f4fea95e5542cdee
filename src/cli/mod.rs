//! CLI module for the Titan user service
//!
//! - `serve`: run the HTTP server (default)
//! - `migrate`: apply, revert or inspect database migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Titan user service - user records with soft delete over HTTP
#[derive(Parser, Debug)]
#[command(name = "titan-user-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Manage the PostgreSQL schema
    Migrate(migrate::MigrateArgs),
}

/// Load `.env` and configuration, then install logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
