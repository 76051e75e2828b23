use sqlx::{PgConnection, PgPool};
use time::PrimitiveDateTime;

use crate::core::metrics::{record_progress_event, ProgressEvent};
use crate::core::time::primitive_now_utc;
use crate::db::models::{ProgressRoot, ProgressSnapshotRow};
use crate::db::types::{ProgressMode, ProgressSource};
use crate::repositories::progress::{CreateAggregate, CreateQuestion, CreateRoot, RootDelta};
use crate::repositories::{catalog, progress, snapshots};
use crate::schemas::analytics::AnalyticsSnapshot;
use crate::schemas::progress::ProgressTree;

use super::counters::{CounterDelta, LeafState};
use super::error::ProgressError;
use super::hierarchy;
use super::tree;

/// Returns the caller's tree, building it from the catalog on first access.
/// A submitted tree is reset in place unless `source` asks for the frozen
/// analytics view.
pub(crate) async fn get_or_initialize(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
    source: ProgressSource,
) -> Result<ProgressTree, ProgressError> {
    let mut tx = pool.begin().await?;
    let now = primitive_now_utc();

    let (root, event) =
        match progress::find_root_for_update(&mut *tx, user_id, course_id, mode).await? {
            Some(root) if root.is_submitted && source == ProgressSource::Content => {
                (reset(&mut tx, &root, now).await?, Some(ProgressEvent::Reset))
            }
            Some(root) => (root, None),
            None => {
                let (root, created) = initialize(&mut tx, user_id, course_id, mode, now).await?;
                (root, created.then_some(ProgressEvent::Initialized))
            }
        };

    let tree = load_tree(&mut tx, &root).await?;
    tx.commit().await?;

    if let Some(event) = event {
        record_progress_event(event, mode);
    }
    Ok(tree)
}

async fn initialize(
    conn: &mut PgConnection,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
    now: PrimitiveDateTime,
) -> Result<(ProgressRoot, bool), ProgressError> {
    if catalog::find_course(&mut *conn, course_id).await?.is_none() {
        return Err(ProgressError::InvalidReference(format!("course {course_id} does not exist")));
    }

    let chapters = catalog::list_chapters(&mut *conn, course_id).await?;
    let subtopics = catalog::list_subtopics(&mut *conn, course_id).await?;
    let questions = catalog::list_questions(&mut *conn, course_id).await?;
    let outline = hierarchy::outline_from_rows(&chapters, &subtopics, &questions);
    let plan = hierarchy::plan(&outline, mode.levels(), new_id)?;

    let root_id = new_id();
    let inserted = progress::insert_root_if_absent(
        &mut *conn,
        CreateRoot {
            id: &root_id,
            user_id,
            course_id,
            mode,
            total_questions: plan.total_questions()?,
            now,
        },
    )
    .await?;

    let Some(root) = inserted else {
        // A concurrent first request won the insert and has committed.
        let root = progress::find_root_for_update(&mut *conn, user_id, course_id, mode)
            .await?
            .ok_or_else(|| {
                ProgressError::NotFound(format!(
                    "progress for course {course_id} was removed while it was being created"
                ))
            })?;
        return Ok((root, false));
    };

    for aggregate in &plan.aggregates {
        progress::insert_aggregate(
            &mut *conn,
            CreateAggregate {
                id: &aggregate.id,
                root_id: &root.id,
                parent_id: aggregate.parent_id.as_deref(),
                level: aggregate.level,
                entity_id: &aggregate.entity_id,
                position: aggregate.position,
            },
        )
        .await?;
    }

    for question in &plan.questions {
        progress::insert_question(
            &mut *conn,
            CreateQuestion {
                id: &question.id,
                root_id: &root.id,
                aggregate_id: question.aggregate_id.as_deref(),
                question_id: &question.question_id,
                position: question.position,
            },
        )
        .await?;
    }

    tracing::info!(
        user_id,
        course_id,
        mode = mode.as_str(),
        total_questions = root.total_questions,
        aggregates = plan.aggregates.len(),
        "Progress tree initialized"
    );

    Ok((root, true))
}

async fn reset(
    conn: &mut PgConnection,
    root: &ProgressRoot,
    now: PrimitiveDateTime,
) -> Result<ProgressRoot, ProgressError> {
    let reset_root = progress::reset_root(&mut *conn, &root.id, now).await?;
    let aggregates = progress::reset_aggregates(&mut *conn, &root.id).await?;
    let leaves = progress::reset_questions(&mut *conn, &root.id).await?;

    tracing::info!(
        user_id = %root.user_id,
        course_id = %root.course_id,
        mode = root.mode.as_str(),
        aggregates,
        leaves,
        "Submitted progress reset for a new attempt"
    );

    Ok(reset_root)
}

async fn load_tree(
    conn: &mut PgConnection,
    root: &ProgressRoot,
) -> Result<ProgressTree, ProgressError> {
    let aggregates = progress::list_aggregates(&mut *conn, &root.id).await?;
    let questions = progress::list_questions(&mut *conn, &root.id).await?;
    Ok(tree::assemble(root, &aggregates, &questions))
}

/// Stores the caller's answer and flag for one question and moves every
/// counter above it by the difference from the previous leaf state.
pub(crate) async fn update_question(
    pool: &PgPool,
    user_id: &str,
    question_id: &str,
    mode: ProgressMode,
    selected_option: Option<i64>,
    is_flagged: bool,
) -> Result<ProgressRoot, ProgressError> {
    let selected_option = selected_option.map(answer_option).transpose()?;

    let mut tx = pool.begin().await?;

    let question = catalog::resolve_question(&mut *tx, question_id).await?.ok_or_else(|| {
        ProgressError::InvalidReference(format!("question {question_id} does not exist"))
    })?;

    let root = progress::find_root_for_update(&mut *tx, user_id, &question.course_id, mode)
        .await?
        .ok_or(ProgressError::NotInitialized)?;
    if root.is_submitted {
        return Err(ProgressError::AlreadySubmitted);
    }

    let leaf = progress::find_question_for_update(&mut *tx, &root.id, question_id)
        .await?
        .ok_or_else(|| {
            ProgressError::InvalidReference(format!(
                "question {question_id} is not part of this progress tree"
            ))
        })?;

    let previous = LeafState { selected_option: leaf.selected_option, is_flagged: leaf.is_flagged };
    let next = LeafState { selected_option, is_flagged };
    let delta = CounterDelta::between(previous, next, question.correct_option);

    progress::set_question_state(&mut *tx, &leaf.id, selected_option, is_flagged).await?;

    if delta.attempted != 0 {
        if let Some(aggregate_id) = leaf.aggregate_id.as_deref() {
            progress::shift_aggregate_chain(&mut *tx, aggregate_id, delta.attempted).await?;
        }
    }

    let updated = progress::apply_root_delta(
        &mut *tx,
        &root.id,
        RootDelta {
            attempted: delta.attempted,
            flagged: delta.flagged,
            skipped: delta.skipped,
            correct: delta.correct,
            last_viewed_question_id: question_id,
            now: primitive_now_utc(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::debug!(
        user_id,
        question_id,
        course_id = %updated.course_id,
        chapter_id = %question.chapter_id,
        subtopic_id = %question.subtopic_id,
        mode = mode.as_str(),
        counters_changed = !delta.is_zero(),
        attempted = updated.attempted_questions,
        correct = updated.correct_count,
        "Question progress updated"
    );
    record_progress_event(ProgressEvent::QuestionUpdated, mode);

    Ok(updated)
}

/// Freezes the active tree and replaces the stored analytics snapshot with it.
pub(crate) async fn submit(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
) -> Result<AnalyticsSnapshot, ProgressError> {
    let mut tx = pool.begin().await?;
    let now = primitive_now_utc();

    let root = progress::find_root_for_update(&mut *tx, user_id, course_id, mode)
        .await?
        .filter(|root| !root.is_submitted)
        .ok_or_else(|| {
            ProgressError::NotFound(format!("no active progress for course {course_id}"))
        })?;

    let root = progress::mark_submitted(&mut *tx, &root.id, now).await?;
    let tree = load_tree(&mut tx, &root).await?;
    let snapshot = AnalyticsSnapshot::capture(user_id, tree, now);
    snapshots::upsert(&mut *tx, &snapshot, now).await?;

    tx.commit().await?;

    tracing::info!(
        user_id,
        course_id,
        mode = mode.as_str(),
        attempted = snapshot.progress.attempted_questions,
        correct = snapshot.progress.correct_count,
        "Progress submitted"
    );
    record_progress_event(ProgressEvent::Submitted, mode);

    Ok(snapshot)
}

pub(crate) async fn is_submitted(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
) -> Result<bool, ProgressError> {
    let root = progress::find_root(pool, user_id, course_id, mode).await?;
    Ok(root.is_some_and(|root| root.is_submitted))
}

/// Latest submitted snapshot. Never falls back to the live tree.
pub(crate) async fn latest_analytics(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
) -> Result<ProgressSnapshotRow, ProgressError> {
    let row = snapshots::find(pool, user_id, course_id, mode).await?.ok_or_else(|| {
        ProgressError::NotFound(format!("no analytics recorded for course {course_id}"))
    })?;

    if let Err(err) = row.data.validate() {
        tracing::error!(
            user_id,
            course_id,
            mode = mode.as_str(),
            stored_version = row.schema_version,
            error = %err,
            "Stored analytics snapshot failed validation"
        );
        return Err(err.into());
    }

    Ok(row)
}

/// Deletes the tree. Succeeds when nothing exists; snapshots are kept.
pub(crate) async fn abandon(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
) -> Result<bool, ProgressError> {
    let mut tx = pool.begin().await?;
    // Waits for in-flight writers on the same root before deleting.
    let existing = progress::find_root_for_update(&mut *tx, user_id, course_id, mode).await?;
    let deleted = match existing {
        Some(_) => progress::delete_root(&mut *tx, user_id, course_id, mode).await?,
        None => false,
    };
    tx.commit().await?;

    if deleted {
        tracing::info!(user_id, course_id, mode = mode.as_str(), "Progress abandoned");
        record_progress_event(ProgressEvent::Abandoned, mode);
    }
    Ok(deleted)
}

/// Narrows a client-supplied option to the stored `SMALLINT`, accepting 0..=3.
fn answer_option(raw: i64) -> Result<i16, ProgressError> {
    i16::try_from(raw)
        .ok()
        .filter(|option| (0..=3).contains(option))
        .ok_or(ProgressError::InvalidOption(raw))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::answer_option;
    use crate::services::progress::ProgressError;

    #[test]
    fn answer_option_accepts_only_zero_to_three() {
        assert_eq!(answer_option(0).ok(), Some(0));
        assert_eq!(answer_option(3).ok(), Some(3));
        for raw in [-1, 4, 70_000, i64::from(i16::MAX) + 1, i64::MIN] {
            assert!(
                matches!(answer_option(raw), Err(ProgressError::InvalidOption(got)) if got == raw),
                "{raw} should be rejected"
            );
        }
    }
}
