// Embedded Diesel migrations.
// MigrationHarness is synchronous, so it runs on a blocking thread over
// diesel-async's sync wrapper around the same tokio-postgres connection type.

use anyhow::{anyhow, Context};
use diesel::Connection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/diesel");

type SyncPgConnection = AsyncConnectionWrapper<AsyncPgConnection>;

/// Run all pending migrations and return how many were applied
pub async fn run_migrations(database_url: &str) -> anyhow::Result<usize> {
    let database_url = database_url.to_string();

    tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        let mut conn = SyncPgConnection::establish(&database_url)
            .context("Failed to establish migration connection")?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;

        for migration in &applied {
            debug!("[DIESEL] Applied migration: {}", migration);
        }
        info!("[DIESEL] Applied {} migrations", applied.len());

        Ok(applied.len())
    })
    .await
    .context("Migration task panicked")?
}

/// Applied and pending migration names, without applying anything
pub async fn check_migration_status(database_url: &str) -> anyhow::Result<MigrationStatus> {
    let database_url = database_url.to_string();

    tokio::task::spawn_blocking(move || -> anyhow::Result<MigrationStatus> {
        let mut conn = SyncPgConnection::establish(&database_url)
            .context("Failed to establish migration connection")?;

        let applied = conn
            .applied_migrations()
            .map_err(|e| anyhow!("Failed to read applied migrations: {}", e))?;
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow!("Failed to read pending migrations: {}", e))?;

        Ok(MigrationStatus {
            applied_migrations: applied.iter().map(|m| m.to_string()).collect(),
            pending_migrations: pending.iter().map(|m| m.name().to_string()).collect(),
        })
    })
    .await
    .context("Migration status task panicked")?
}

#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub applied_migrations: Vec<String>,
    pub pending_migrations: Vec<String>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending_migrations.is_empty()
    }
}
