use time::PrimitiveDateTime;

use crate::db::models::ProgressRoot;
use crate::db::types::ProgressMode;

use super::types::{CreateAggregate, CreateQuestion, CreateRoot, RootDelta, ROOT_COLUMNS};

/// Returns `None` when a concurrent request already created the root; the
/// caller then reads the winner's row.
pub(crate) async fn insert_root_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateRoot<'_>,
) -> Result<Option<ProgressRoot>, sqlx::Error> {
    sqlx::query_as::<_, ProgressRoot>(&format!(
        "INSERT INTO progress_roots (
            id, user_id, course_id, mode, total_questions, attempted_questions, flagged_count,
            skipped_count, correct_count, last_viewed_question_id, is_submitted, created_at,
            updated_at
         ) VALUES ($1,$2,$3,$4,$5,0,0,$5,0,NULL,FALSE,$6,$6)
         ON CONFLICT (user_id, course_id, mode) DO NOTHING
         RETURNING {ROOT_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.course_id)
    .bind(params.mode)
    .bind(params.total_questions)
    .bind(params.now)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn insert_aggregate(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAggregate<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO progress_aggregates (
            id, root_id, parent_id, level, entity_id, position, attempted_questions
         ) VALUES ($1,$2,$3,$4,$5,$6,0)",
    )
    .bind(params.id)
    .bind(params.root_id)
    .bind(params.parent_id)
    .bind(params.level)
    .bind(params.entity_id)
    .bind(params.position)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn insert_question(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO progress_questions (
            id, root_id, aggregate_id, question_id, position, selected_option, is_flagged
         ) VALUES ($1,$2,$3,$4,$5,NULL,FALSE)",
    )
    .bind(params.id)
    .bind(params.root_id)
    .bind(params.aggregate_id)
    .bind(params.question_id)
    .bind(params.position)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn reset_root(
    executor: impl sqlx::PgExecutor<'_>,
    root_id: &str,
    now: PrimitiveDateTime,
) -> Result<ProgressRoot, sqlx::Error> {
    sqlx::query_as::<_, ProgressRoot>(&format!(
        "UPDATE progress_roots
         SET attempted_questions = 0,
             flagged_count = 0,
             correct_count = 0,
             skipped_count = total_questions,
             last_viewed_question_id = NULL,
             is_submitted = FALSE,
             updated_at = $2
         WHERE id = $1
         RETURNING {ROOT_COLUMNS}"
    ))
    .bind(root_id)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn reset_aggregates(
    executor: impl sqlx::PgExecutor<'_>,
    root_id: &str,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE progress_aggregates SET attempted_questions = 0 WHERE root_id = $1")
            .bind(root_id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn reset_questions(
    executor: impl sqlx::PgExecutor<'_>,
    root_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE progress_questions
         SET selected_option = NULL, is_flagged = FALSE
         WHERE root_id = $1",
    )
    .bind(root_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn set_question_state(
    executor: impl sqlx::PgExecutor<'_>,
    leaf_id: &str,
    selected_option: Option<i16>,
    is_flagged: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE progress_questions
         SET selected_option = $2, is_flagged = $3
         WHERE id = $1",
    )
    .bind(leaf_id)
    .bind(selected_option)
    .bind(is_flagged)
    .execute(executor)
    .await?;
    Ok(())
}

/// Adds `attempted_delta` to the aggregate and every ancestor above it.
pub(crate) async fn shift_aggregate_chain(
    executor: impl sqlx::PgExecutor<'_>,
    aggregate_id: &str,
    attempted_delta: i32,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "WITH RECURSIVE chain AS (
            SELECT id, parent_id
            FROM progress_aggregates
            WHERE id = $1
            UNION ALL
            SELECT pa.id, pa.parent_id
            FROM progress_aggregates pa
            JOIN chain ON pa.id = chain.parent_id
        )
        UPDATE progress_aggregates
        SET attempted_questions = attempted_questions + $2
        WHERE id IN (SELECT id FROM chain)",
    )
    .bind(aggregate_id)
    .bind(attempted_delta)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn apply_root_delta(
    executor: impl sqlx::PgExecutor<'_>,
    root_id: &str,
    delta: RootDelta<'_>,
) -> Result<ProgressRoot, sqlx::Error> {
    sqlx::query_as::<_, ProgressRoot>(&format!(
        "UPDATE progress_roots
         SET attempted_questions = attempted_questions + $2,
             flagged_count = flagged_count + $3,
             skipped_count = skipped_count + $4,
             correct_count = correct_count + $5,
             last_viewed_question_id = $6,
             updated_at = $7
         WHERE id = $1
         RETURNING {ROOT_COLUMNS}"
    ))
    .bind(root_id)
    .bind(delta.attempted)
    .bind(delta.flagged)
    .bind(delta.skipped)
    .bind(delta.correct)
    .bind(delta.last_viewed_question_id)
    .bind(delta.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn mark_submitted(
    executor: impl sqlx::PgExecutor<'_>,
    root_id: &str,
    now: PrimitiveDateTime,
) -> Result<ProgressRoot, sqlx::Error> {
    sqlx::query_as::<_, ProgressRoot>(&format!(
        "UPDATE progress_roots
         SET is_submitted = TRUE, updated_at = $2
         WHERE id = $1
         RETURNING {ROOT_COLUMNS}"
    ))
    .bind(root_id)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// Aggregates and leaves go with the root through `ON DELETE CASCADE`.
pub(crate) async fn delete_root(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM progress_roots
         WHERE user_id = $1 AND course_id = $2 AND mode = $3",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(mode)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
