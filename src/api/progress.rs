use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::extract::{JsonBody, QueryParams};
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::db::types::ProgressMode;
use crate::schemas::analytics::LatestAnalyticsResponse;
use crate::schemas::progress::{
    ProgressQuery, ProgressTree, QuestionUpdateResponse, StatusResponse,
    SubmissionStatusResponse, UpdateQuestionRequest,
};
use crate::services::progress;


pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:mode/courses/:course_id", get(get_progress))
        .route("/:mode/courses/:course_id/submit", post(submit))
        .route("/:mode/courses/:course_id/is-submitted", get(is_submitted))
        .route("/:mode/courses/:course_id/latest-analytics", get(latest_analytics))
        .route("/:mode/courses/:course_id/quit", post(quit))
        .route("/:mode/questions/:question_id", post(update_question))
}

fn parse_mode(raw: &str) -> Result<ProgressMode, ApiError> {
    raw.parse::<ProgressMode>().map_err(ApiError::BadRequest)
}

async fn get_progress(
    Path((mode, course_id)): Path<(String, String)>,
    QueryParams(query): QueryParams<ProgressQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProgressTree>, ApiError> {
    let mode = parse_mode(&mode)?;
    let tree =
        progress::get_or_initialize(state.db(), &user.id, &course_id, mode, query.source).await?;
    Ok(Json(tree))
}

async fn update_question(
    Path((mode, question_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UpdateQuestionRequest>,
) -> Result<Json<QuestionUpdateResponse>, ApiError> {
    let mode = parse_mode(&mode)?;
    let root = progress::update_question(
        state.db(),
        &user.id,
        &question_id,
        mode,
        payload.selected_option,
        payload.is_flagged,
    )
    .await?;
    Ok(Json(QuestionUpdateResponse::from_root(&root)))
}

async fn submit(
    Path((mode, course_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mode = parse_mode(&mode)?;
    progress::submit(state.db(), &user.id, &course_id, mode).await?;
    Ok(Json(StatusResponse { status: "progress submitted".to_string() }))
}

async fn is_submitted(
    Path((mode, course_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionStatusResponse>, ApiError> {
    let mode = parse_mode(&mode)?;
    let is_submitted = progress::is_submitted(state.db(), &user.id, &course_id, mode).await?;
    Ok(Json(SubmissionStatusResponse { course_id, mode, is_submitted }))
}

async fn latest_analytics(
    Path((mode, course_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LatestAnalyticsResponse>, ApiError> {
    let mode = parse_mode(&mode)?;
    let row = progress::latest_analytics(state.db(), &user.id, &course_id, mode).await?;
    Ok(Json(LatestAnalyticsResponse::from_db(row)))
}

async fn quit(
    Path((mode, course_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mode = parse_mode(&mode)?;
    progress::abandon(state.db(), &user.id, &course_id, mode).await?;
    Ok(Json(StatusResponse { status: "progress abandoned".to_string() }))
}
