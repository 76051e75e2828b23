pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    if settings.security().secret_key_generated {
        tracing::warn!(
            "SECRET_KEY is not set; using a generated key stored in .secret_key. \
             Tokens from the identity provider will not verify until it is configured"
        );
    }

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let state = AppState::new(settings, db_pool);
    let app = api::router::router(state.clone());
    let server = state.settings().server();
    let listener = tokio::net::TcpListener::bind(server.addr()).await?;

    tracing::info!(
        host = %server.host,
        port = server.port,
        environment = %state.settings().runtime().environment.as_str(),
        "Elevate progress API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    state.db().close().await;
    tracing::info!("Database pool closed");

    Ok(())
}
