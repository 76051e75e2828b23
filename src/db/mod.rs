pub(crate) mod models;
pub(crate) mod types;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::core::config::Settings;

/// Opens the pool. Every session gets a `lock_timeout` so a request queued
/// behind a held progress-root lock fails instead of waiting indefinitely.
pub(crate) async fn init_pool(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let database = settings.database();
    let pool = &database.pool;

    let mut connect_options = database
        .database_url()
        .parse::<PgConnectOptions>()?
        .application_name("elevate-progress")
        .log_statements(tracing::log::LevelFilter::Off);
    if let Some(lock_timeout) = pool.lock_timeout() {
        let millis = lock_timeout.as_millis().to_string();
        connect_options = connect_options.options([("lock_timeout", millis.as_str())]);
    }

    tracing::debug!(
        max_connections = pool.max_connections,
        min_connections = pool.min_connections,
        lock_timeout_ms = pool.lock_timeout_ms,
        "Opening database pool"
    );

    PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(pool.acquire_timeout())
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
}

pub(crate) async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
