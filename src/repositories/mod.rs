pub(crate) mod catalog;
pub(crate) mod enrollments;
pub(crate) mod health;
pub(crate) mod progress;
pub(crate) mod snapshots;
