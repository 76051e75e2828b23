//! Progress state machine: lazy tree construction, per-question counter
//! deltas, submission snapshots, reset and abandonment. Quiz and test
//! modes share one engine; the mode only decides which catalog levels
//! become aggregate nodes.

mod counters;
mod engine;
mod error;
mod hierarchy;
mod tree;

pub(crate) use engine::{
    abandon, get_or_initialize, is_submitted, latest_analytics, submit, update_question,
};
pub(crate) use error::ProgressError;
