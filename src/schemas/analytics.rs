use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::time::format_primitive;
use crate::db::models::ProgressSnapshotRow;
use crate::db::types::ProgressMode;
use crate::schemas::progress::ProgressTree;

pub(crate) const SNAPSHOT_SCHEMA_VERSION: i32 = 1;

/// Frozen copy of a progress tree taken at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AnalyticsSnapshot {
    pub(crate) schema_version: i32,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) mode: ProgressMode,
    pub(crate) captured_at: String,
    pub(crate) progress: ProgressTree,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SnapshotError {
    #[error("unsupported snapshot schema version {0}")]
    UnsupportedVersion(i32),
    #[error("snapshot header does not match its progress tree: {0}")]
    HeaderMismatch(&'static str),
    #[error("snapshot counters are inconsistent: {0}")]
    Counters(String),
}

impl AnalyticsSnapshot {
    pub(crate) fn capture(
        user_id: &str,
        progress: ProgressTree,
        captured_at: time::PrimitiveDateTime,
    ) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            user_id: user_id.to_string(),
            course_id: progress.course_id.clone(),
            mode: progress.mode,
            captured_at: format_primitive(captured_at),
            progress,
        }
    }

    /// Checks a snapshot read back from storage before it is served.
    pub(crate) fn validate(&self) -> Result<(), SnapshotError> {
        if self.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.schema_version));
        }
        if self.course_id != self.progress.course_id {
            return Err(SnapshotError::HeaderMismatch("course_id"));
        }
        if self.mode != self.progress.mode {
            return Err(SnapshotError::HeaderMismatch("mode"));
        }
        if !self.progress.is_submitted {
            return Err(SnapshotError::HeaderMismatch("is_submitted"));
        }
        match self.progress.find_inconsistency() {
            Some(problem) => Err(SnapshotError::Counters(problem)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LatestAnalyticsResponse {
    pub(crate) course_id: String,
    pub(crate) mode: ProgressMode,
    pub(crate) data: AnalyticsSnapshot,
    pub(crate) updated_at: String,
}

impl LatestAnalyticsResponse {
    pub(crate) fn from_db(row: ProgressSnapshotRow) -> Self {
        Self {
            course_id: row.course_id,
            mode: row.mode,
            data: row.data.0,
            updated_at: format_primitive(row.updated_at),
        }
    }
}
