use time::PrimitiveDateTime;

use crate::db::types::{AggregateLevel, ProgressMode};

pub(super) const ROOT_COLUMNS: &str = "\
    id, user_id, course_id, mode, total_questions, attempted_questions, flagged_count, \
    skipped_count, correct_count, last_viewed_question_id, is_submitted, created_at, updated_at";

pub(super) const AGGREGATE_COLUMNS: &str =
    "id, root_id, parent_id, level, entity_id, position, attempted_questions";

pub(super) const QUESTION_COLUMNS: &str =
    "id, root_id, aggregate_id, question_id, position, selected_option, is_flagged";

pub(crate) struct CreateRoot<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) mode: ProgressMode,
    pub(crate) total_questions: i32,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) struct CreateAggregate<'a> {
    pub(crate) id: &'a str,
    pub(crate) root_id: &'a str,
    pub(crate) parent_id: Option<&'a str>,
    pub(crate) level: AggregateLevel,
    pub(crate) entity_id: &'a str,
    pub(crate) position: i32,
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) root_id: &'a str,
    pub(crate) aggregate_id: Option<&'a str>,
    pub(crate) question_id: &'a str,
    pub(crate) position: i32,
}

/// Counter changes applied to a root in a single statement.
pub(crate) struct RootDelta<'a> {
    pub(crate) attempted: i32,
    pub(crate) flagged: i32,
    pub(crate) skipped: i32,
    pub(crate) correct: i32,
    pub(crate) last_viewed_question_id: &'a str,
    pub(crate) now: PrimitiveDateTime,
}
