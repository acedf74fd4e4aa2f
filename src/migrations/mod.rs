// Startup migration entry point. Migrations are embedded in the binary.

pub mod diesel;

use tracing::{info, warn};

use crate::app_config::{AppConfig, StorageBackend};

/// Migrations only apply to the Postgres backend and can be switched off
pub fn should_run_migrations(config: &AppConfig) -> bool {
    config.storage_backend == StorageBackend::Postgres && !config.disable_embedded_migrations
}

pub async fn run_startup_migrations(config: &AppConfig) -> anyhow::Result<()> {
    if !should_run_migrations(config) {
        info!("[MIGRATIONS] Skipping embedded migrations");
        return Ok(());
    }

    let status = diesel::check_migration_status(&config.database_url).await?;
    if status.is_up_to_date() {
        info!(
            "[MIGRATIONS] Schema up to date ({} applied)",
            status.applied_migrations.len()
        );
        return Ok(());
    }

    warn!(
        "[MIGRATIONS] {} pending: {}",
        status.pending_migrations.len(),
        status.pending_migrations.join(", ")
    );
    let applied = diesel::run_migrations(&config.database_url).await?;
    info!("[MIGRATIONS] Applied {} migrations", applied);

    Ok(())
}
