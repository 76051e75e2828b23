use sqlx::types::Json;
use time::PrimitiveDateTime;

use crate::db::models::ProgressSnapshotRow;
use crate::db::types::ProgressMode;
use crate::schemas::analytics::AnalyticsSnapshot;

const COLUMNS: &str = "user_id, course_id, mode, schema_version, data, updated_at";

/// One snapshot per (user, course, mode); a later submission replaces it.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    snapshot: &AnalyticsSnapshot,
    now: PrimitiveDateTime,
) -> Result<ProgressSnapshotRow, sqlx::Error> {
    sqlx::query_as::<_, ProgressSnapshotRow>(&format!(
        "INSERT INTO progress_snapshots (user_id, course_id, mode, schema_version, data, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT (user_id, course_id, mode) DO UPDATE
         SET schema_version = EXCLUDED.schema_version,
             data = EXCLUDED.data,
             updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}"
    ))
    .bind(&snapshot.user_id)
    .bind(&snapshot.course_id)
    .bind(snapshot.mode)
    .bind(snapshot.schema_version)
    .bind(Json(snapshot))
    .bind(now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
    mode: ProgressMode,
) -> Result<Option<ProgressSnapshotRow>, sqlx::Error> {
    sqlx::query_as::<_, ProgressSnapshotRow>(&format!(
        "SELECT {COLUMNS}
         FROM progress_snapshots
         WHERE user_id = $1 AND course_id = $2 AND mode = $3"
    ))
    .bind(user_id)
    .bind(course_id)
    .bind(mode)
    .fetch_optional(executor)
    .await
}
