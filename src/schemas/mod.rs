use serde::Serialize;

pub(crate) mod analytics;
pub(crate) mod enrollment;
pub(crate) mod progress;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: &'static str,
    pub(crate) status: &'static str,
    pub(crate) database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub(crate) struct DatabaseHealth {
    pub(crate) reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) schema_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    pub(crate) pool_size: u32,
    pub(crate) pool_idle: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) docs_url: String,
}
