use thiserror::Error;

use crate::schemas::analytics::SnapshotError;

use super::hierarchy::OutlineTooLarge;

#[derive(Debug, Error)]
pub(crate) enum ProgressError {
    #[error("progress has not been initialized for this course; load the course progress first")]
    NotInitialized,
    #[error("progress has already been submitted; reload the course progress to start over")]
    AlreadySubmitted,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidReference(String),
    #[error("selected_option must be between 0 and 3, got {0}")]
    InvalidOption(i64),
    #[error(transparent)]
    OutlineTooLarge(#[from] OutlineTooLarge),
    #[error("stored analytics snapshot is unreadable: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ProgressError {
    /// Stable machine-readable name, returned to clients next to the message.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ProgressError::NotInitialized => "not_initialized",
            ProgressError::AlreadySubmitted => "already_submitted",
            ProgressError::NotFound(_) => "not_found",
            ProgressError::InvalidReference(_) => "invalid_reference",
            ProgressError::InvalidOption(_) => "invalid_option",
            ProgressError::OutlineTooLarge(_)
            | ProgressError::Snapshot(_)
            | ProgressError::Storage(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(ProgressError::NotInitialized.kind(), "not_initialized");
        assert_eq!(ProgressError::AlreadySubmitted.kind(), "already_submitted");
        assert_eq!(ProgressError::InvalidOption(7).kind(), "invalid_option");
        assert_eq!(ProgressError::Storage(sqlx::Error::RowNotFound).kind(), "internal");
        assert_eq!(ProgressError::OutlineTooLarge(OutlineTooLarge(1 << 40)).kind(), "internal");
        assert_eq!(
            ProgressError::Snapshot(SnapshotError::UnsupportedVersion(9)).kind(),
            "internal"
        );
    }
}
