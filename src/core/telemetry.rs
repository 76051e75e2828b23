use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// Installs the global subscriber. `RUST_LOG` wins over `ELEVATE_LOG_LEVEL`.
pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let telemetry = settings.telemetry();
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&telemetry.log_level))?,
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let installed =
        if telemetry.json { builder.json().try_init() } else { builder.compact().try_init() };
    installed.map_err(|err| anyhow::anyhow!("tracing subscriber: {err}"))
}

// sqlx logs every acquire at info; progress writes would drown the request spans.
fn default_directives(level: &str) -> String {
    format!("{level},sqlx=warn,tower_http=info")
}
