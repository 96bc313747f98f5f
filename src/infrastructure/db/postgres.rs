use std::time::Duration;

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

const MAX_CONNECT_RETRIES: u32 = 5;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let mut retry_count = 0;
    let mut wait_seconds = 2;

    loop {
        match PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                info!("Database connection established.");
                return Ok(pool);
            }
            Err(e) if retry_count < MAX_CONNECT_RETRIES => {
                retry_count += 1;
                warn!(
                    "Failed to connect to database (attempt {}/{}): {}. Retrying in {}s...",
                    retry_count, MAX_CONNECT_RETRIES, e, wait_seconds
                );

                tokio::time::sleep(Duration::from_secs(wait_seconds)).await;

                wait_seconds *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied.");
    Ok(())
}

/// Backing store the API is serving from, as reported by the health check.
#[derive(Debug, Clone)]
pub enum Storage {
    Postgres(PgPool),
    InMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageStatus {
    Connected,
    Unavailable,
    InMemory,
}

impl Storage {
    pub async fn status(&self) -> StorageStatus {
        match self {
            Storage::InMemory => StorageStatus::InMemory,
            Storage::Postgres(pool) => match sqlx::query("SELECT 1").execute(pool).await {
                Ok(_) => StorageStatus::Connected,
                Err(e) => {
                    warn!(error = %e, "Database health probe failed");
                    StorageStatus::Unavailable
                }
            },
        }
    }
}
