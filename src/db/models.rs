use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{AggregateLevel, EnrollmentStatus, ProgressMode};
use crate::schemas::analytics::AnalyticsSnapshot;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProgressRoot {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) mode: ProgressMode,
    pub(crate) total_questions: i32,
    pub(crate) attempted_questions: i32,
    pub(crate) flagged_count: i32,
    pub(crate) skipped_count: i32,
    pub(crate) correct_count: i32,
    pub(crate) last_viewed_question_id: Option<String>,
    pub(crate) is_submitted: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProgressAggregate {
    pub(crate) id: String,
    pub(crate) root_id: String,
    pub(crate) parent_id: Option<String>,
    pub(crate) level: AggregateLevel,
    pub(crate) entity_id: String,
    pub(crate) position: i32,
    pub(crate) attempted_questions: i32,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct QuestionProgress {
    pub(crate) id: String,
    pub(crate) root_id: String,
    pub(crate) aggregate_id: Option<String>,
    pub(crate) question_id: String,
    pub(crate) position: i32,
    pub(crate) selected_option: Option<i16>,
    pub(crate) is_flagged: bool,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProgressSnapshotRow {
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) mode: ProgressMode,
    pub(crate) schema_version: i32,
    pub(crate) data: Json<AnalyticsSnapshot>,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Enrollment {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) status: EnrollmentStatus,
    pub(crate) enrolled_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
