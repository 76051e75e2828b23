use crate::db::models::{ProgressAggregate, ProgressRoot, QuestionProgress};
use crate::db::types::ProgressMode;

use super::types::{AGGREGATE_COLUMNS, QUESTION_COLUMNS, ROOT_COLUMNS};

pub(crate) async fn find_root(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
) -> Result<Option<ProgressRoot>, sqlx::Error> {
    sqlx::query_as::<_, ProgressRoot>(&format!(
        "SELECT {ROOT_COLUMNS}
         FROM progress_roots
         WHERE user_id = $1 AND course_id = $2 AND mode = $3"
    ))
    .bind(user_id)
    .bind(course_id)
    .bind(mode)
    .fetch_optional(executor)
    .await
}

/// Locks the root row for the rest of the transaction. Every mutation of a
/// tree goes through this lock, which serializes writers per root.
pub(crate) async fn find_root_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
) -> Result<Option<ProgressRoot>, sqlx::Error> {
    sqlx::query_as::<_, ProgressRoot>(&format!(
        "SELECT {ROOT_COLUMNS}
         FROM progress_roots
         WHERE user_id = $1 AND course_id = $2 AND mode = $3
         FOR UPDATE"
    ))
    .bind(user_id)
    .bind(course_id)
    .bind(mode)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_aggregates(
    executor: impl sqlx::PgExecutor<'_>,
    root_id: &str,
) -> Result<Vec<ProgressAggregate>, sqlx::Error> {
    sqlx::query_as::<_, ProgressAggregate>(&format!(
        "SELECT {AGGREGATE_COLUMNS}
         FROM progress_aggregates
         WHERE root_id = $1
         ORDER BY position"
    ))
    .bind(root_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_questions(
    executor: impl sqlx::PgExecutor<'_>,
    root_id: &str,
) -> Result<Vec<QuestionProgress>, sqlx::Error> {
    sqlx::query_as::<_, QuestionProgress>(&format!(
        "SELECT {QUESTION_COLUMNS}
         FROM progress_questions
         WHERE root_id = $1
         ORDER BY position"
    ))
    .bind(root_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn find_question_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    root_id: &str,
    question_id: &str,
) -> Result<Option<QuestionProgress>, sqlx::Error> {
    sqlx::query_as::<_, QuestionProgress>(&format!(
        "SELECT {QUESTION_COLUMNS}
         FROM progress_questions
         WHERE root_id = $1 AND question_id = $2
         FOR UPDATE"
    ))
    .bind(root_id)
    .bind(question_id)
    .fetch_optional(executor)
    .await
}
