use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;

const COLUMNS: &str = "id, user_id, course_id, status, enrolled_at, updated_at";

pub(crate) struct CreateEnrollment<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateEnrollment<'_>,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, user_id, course_id, status, enrolled_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$5)
         ON CONFLICT (user_id, course_id) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.course_id)
    .bind(EnrollmentStatus::Studying)
    .bind(params.now)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS}
         FROM enrollments
         WHERE user_id = $1 AND course_id = $2"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS}
         FROM enrollments
         WHERE user_id = $1
         ORDER BY enrolled_at DESC, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update_status(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    status: EnrollmentStatus,
    now: PrimitiveDateTime,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "UPDATE enrollments
         SET status = $3, updated_at = $4
         WHERE user_id = $1 AND course_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(course_id)
    .bind(status)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
        .bind(user_id)
        .bind(course_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
