// Diesel-async connection pool backed by bb8

use anyhow::Context;
use bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use std::time::Duration;

use crate::app_config::AppConfig;

pub type DieselPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Pool settings, taken from the `DATABASE_*` variables
#[derive(Debug, Clone)]
pub struct DieselDatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub test_on_checkout: bool,
}

impl DieselDatabaseConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            url: config.database_url.clone(),
            max_connections: config.database_max_connections,
            min_connections: config.database_min_connections,
            connection_timeout: Duration::from_secs(config.database_connect_timeout),
            idle_timeout: Duration::from_secs(config.database_idle_timeout),
            max_lifetime: Duration::from_secs(config.database_max_lifetime),
            test_on_checkout: true,
        }
    }
}

/// Create the pool and check out one connection to fail fast on bad credentials
pub async fn create_diesel_pool(config: DieselDatabaseConfig) -> anyhow::Result<DieselPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.clone());

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(config.connection_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .max_lifetime(Some(config.max_lifetime))
        .test_on_check_out(config.test_on_checkout)
        .build(manager)
        .await
        .with_context(|| format!("Failed to build pool for {}", mask_connection_string(&config.url)))?;

    let conn = pool.get().await.context("Failed to check out initial connection")?;
    drop(conn);

    tracing::info!(
        "Diesel pool initialized for {} with {} max connections",
        mask_connection_string(&config.url),
        config.max_connections
    );

    Ok(pool)
}

/// Round-trip a trivial query through a pooled connection
pub async fn check_diesel_health(pool: &DieselPool) -> anyhow::Result<()> {
    let mut conn = pool.get().await.context("Failed to check out connection")?;
    diesel::sql_query("SELECT 1")
        .execute(&mut conn)
        .await
        .context("Health query failed")?;
    Ok(())
}

/// Mask database connection string for logging
pub fn mask_connection_string(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let scheme = if parsed.scheme() == "postgres" {
            "postgresql"
        } else {
            parsed.scheme()
        };
        let host = parsed.host_str().unwrap_or("***");
        let path = parsed.path();

        if parsed.username().is_empty() && parsed.password().is_none() {
            format!("{}://{}{}", scheme, host, path)
        } else {
            format!("{}://***:***@{}{}", scheme, host, path)
        }
    } else {
        "postgresql://***:***@***".to_string()
    }
}
