use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::core::metrics;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::{DatabaseHealth, HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let api = state.settings().api();
    let response = RootResponse {
        message: api.project_name.clone(),
        version: api.version.clone(),
        docs_url: format!("{}/docs", api.api_v1_str),
    };

    Json(response)
}

pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let pool = state.db();
    let mut database = DatabaseHealth {
        reachable: true,
        schema_version: None,
        error: None,
        pool_size: pool.size(),
        pool_idle: pool.num_idle(),
    };

    match repositories::health::schema_version(pool).await {
        Ok(version) => database.schema_version = version,
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            database.reachable = false;
            database.error = Some(err.to_string());
        }
    }

    let status = if database.reachable { "healthy" } else { "degraded" };
    Json(HealthResponse { service: "elevate-progress", status, database })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
