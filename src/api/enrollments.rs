use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::enrollment::{EnrollRequest, EnrollmentResponse, EnrollmentUpdate};

#[cfg(test)]
mod tests;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_enrollments).post(enroll)).route(
        "/:course_id",
        get(get_enrollment).patch(update_enrollment).delete(unenroll),
    )
}

async fn enroll(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::catalog::find_course(state.db(), &payload.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?;
    if course.is_none() {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    let created = repositories::enrollments::create_if_absent(
        state.db(),
        repositories::enrollments::CreateEnrollment {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            course_id: &payload.course_id,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create enrollment"))?;

    if let Some(enrollment) = created {
        tracing::info!(user_id = %user.id, course_id = %enrollment.course_id, "User enrolled");
        return Ok((StatusCode::CREATED, Json(EnrollmentResponse::from_db(enrollment))));
    }

    let existing = repositories::enrollments::find(state.db(), &user.id, &payload.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch enrollment"))?
        .ok_or_else(|| {
            ApiError::internal("enrollment missing after insert conflict", "Failed to enroll")
        })?;

    Ok((StatusCode::OK, Json(EnrollmentResponse::from_db(existing))))
}

async fn list_enrollments(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let enrollments = repositories::enrollments::list_for_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrollments"))?;

    Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from_db).collect()))
}

async fn get_enrollment(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let enrollment = repositories::enrollments::find(state.db(), &user.id, &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch enrollment"))?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;

    Ok(Json(EnrollmentResponse::from_db(enrollment)))
}

async fn update_enrollment(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<EnrollmentUpdate>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let enrollment = repositories::enrollments::update_status(
        state.db(),
        &user.id,
        &course_id,
        payload.status,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update enrollment"))?
    .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;

    Ok(Json(EnrollmentResponse::from_db(enrollment)))
}

async fn unenroll(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::enrollments::delete(state.db(), &user.id, &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete enrollment"))?;

    if deleted {
        tracing::info!(user_id = %user.id, course_id = %course_id, "User unenrolled");
    }
    Ok(StatusCode::NO_CONTENT)
}
