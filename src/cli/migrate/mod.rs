//! Migrate command - manages the users schema on the writer database

use clap::{Args, Subcommand};
use tracing::info;

use crate::infrastructure::storage::{user_migrations, PostgresConfig, PostgresMigrator};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Revert the latest applied migration
    Down,
    /// Show applied migration versions
    Status,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let pool = PostgresConfig::from_database(&config.database, &config.database.writer_url)
        .connect()
        .await?;
    let migrator = PostgresMigrator::new(pool);
    let migrations = user_migrations();

    match args.action {
        MigrateAction::Up => {
            let applied = migrator.run_all(&migrations).await?;
            info!(?applied, "Migrations applied");
        }
        MigrateAction::Down => match migrator.revert_latest(&migrations).await? {
            Some(version) => info!(version, "Migration reverted"),
            None => info!("No migration to revert"),
        },
        MigrateAction::Status => {
            let applied = migrator.applied_versions().await?;
            let pending: Vec<i64> = migrations
                .iter()
                .map(|m| m.version)
                .filter(|v| !applied.contains(v))
                .collect();

            info!(?applied, ?pending, "Migration status");
        }
    }

    Ok(())
}
