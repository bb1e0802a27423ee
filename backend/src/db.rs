//! Database pool lifecycle
//!
//! The pool is opened once at startup, migrated if configured, shared
//! through `AppState`, and closed after the server has drained.

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;

/// Open the connection pool
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!("Database connection established");
    Ok(pool)
}

/// Apply pending migrations from `backend/migrations`
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations completed");
    Ok(())
}

/// Close every connection once in-flight requests have finished
pub async fn close(pool: PgPool) {
    pool.close().await;
    tracing::info!("Database pool closed");
}
