use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;
use crate::db::types::ProgressMode;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

/// Lifecycle transitions of a progress root, exported as `progress_<event>_total{mode}`.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ProgressEvent {
    Initialized,
    Reset,
    QuestionUpdated,
    Submitted,
    Abandoned,
}

impl ProgressEvent {
    fn metric_name(self) -> &'static str {
        match self {
            ProgressEvent::Initialized => "progress_initialized_total",
            ProgressEvent::Reset => "progress_resets_total",
            ProgressEvent::QuestionUpdated => "progress_question_updates_total",
            ProgressEvent::Submitted => "progress_submissions_total",
            ProgressEvent::Abandoned => "progress_abandoned_total",
        }
    }
}

pub(crate) fn record_progress_event(event: ProgressEvent, mode: ProgressMode) {
    metrics::counter!(event.metric_name(), "mode" => mode.as_str()).increment(1);
}
