use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Subtitle, SubtitleId, TaskId, TaskRecord, VideoId};
use crate::presentation::handlers::api_response::{ApiError, ApiResponse};
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSubtitleRequest {
    pub video_id: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid {}: {}", what, raw)))
}

#[tracing::instrument(skip(state, payload))]
pub async fn generate_subtitle_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateSubtitleRequest>, JsonRejection>,
) -> Result<ApiResponse<TaskId>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let video_id = VideoId::from_uuid(parse_uuid(&request.video_id, "video ID")?);

    let task_id = state
        .subtitle_service
        .submit(video_id, &request.language, &request.format)
        .await?;

    tracing::info!(task_id = %task_id, video_id = %video_id, "Subtitle generation requested");
    Ok(ApiResponse::ok_with_message(
        "subtitle generation started",
        task_id,
    ))
}

#[tracing::instrument(skip(state))]
pub async fn task_status_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<ApiResponse<TaskRecord>, ApiError> {
    let task_id = TaskId::from_uuid(parse_uuid(&task_id, "task ID")?);
    let task = state.subtitle_service.get_task_status(task_id).await?;
    Ok(ApiResponse::ok(task))
}

#[tracing::instrument(skip(state))]
pub async fn list_video_subtitles_handler(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<Vec<Subtitle>>, ApiError> {
    let video_id = VideoId::from_uuid(parse_uuid(&video_id, "video ID")?);
    let subtitles = state.subtitle_service.list_by_video(video_id).await?;
    Ok(ApiResponse::ok(subtitles))
}

#[tracing::instrument(skip(state))]
pub async fn get_subtitle_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Subtitle>, ApiError> {
    let id = SubtitleId::from_uuid(parse_uuid(&id, "subtitle ID")?);
    let subtitle = state.subtitle_service.get(id).await?;
    Ok(ApiResponse::ok(subtitle))
}

/// Raw subtitle bytes, not wrapped in the JSON envelope.
#[tracing::instrument(skip(state))]
pub async fn export_subtitle_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = SubtitleId::from_uuid(parse_uuid(&id, "subtitle ID")?);
    let export = state
        .subtitle_service
        .export(id, query.format.as_deref())
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, export.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.bytes,
    ))
}

#[tracing::instrument(skip(state))]
pub async fn delete_subtitle_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SubtitleId::from_uuid(parse_uuid(&id, "subtitle ID")?);
    state.subtitle_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
