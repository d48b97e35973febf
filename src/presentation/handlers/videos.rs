use std::io;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;

use crate::application::services::VideoUpload;
use crate::domain::{Video, VideoId};
use crate::presentation::handlers::api_response::{ApiError, ApiResponse};
use crate::presentation::handlers::subtitles::parse_uuid;
use crate::presentation::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ANONYMOUS_OWNER: &str = "anonymous";

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    #[serde(default)]
    pub filename: String,
}

fn owner_of(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_OWNER)
        .to_string()
}

/// Streams the `file` part to storage. `title` and `language` are honoured when they precede it.
#[tracing::instrument(skip(state, headers, multipart))]
pub async fn upload_video_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<ApiResponse<Video>, ApiError> {
    let owner_id = owner_of(&headers);
    let mut title = None;
    let mut language = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                tracing::warn!("Upload request with no file");
                return Err(ApiError::bad_request("No file uploaded"));
            }
            Err(e) => {
                return Err(ApiError::bad_request(format!(
                    "Failed to read multipart: {}",
                    e
                )));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(read_text(field).await?),
            "language" => language = Some(read_text(field).await?),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                tracing::debug!(file_name = %file_name, owner = %owner_id, "Receiving video upload");

                let stream = field.map_err(io::Error::other).boxed();
                let video = state
                    .video_service
                    .upload(VideoUpload {
                        owner_id,
                        file_name,
                        title,
                        language,
                        stream,
                    })
                    .await?;
                return Ok(ApiResponse::ok_with_message("upload succeeded", video));
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read form field: {}", e)))
}

#[tracing::instrument(skip(state, headers))]
pub async fn list_videos_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse<Vec<Video>>, ApiError> {
    let videos = state.video_service.list(&owner_of(&headers)).await?;
    Ok(ApiResponse::ok(videos))
}

#[tracing::instrument(skip(state))]
pub async fn get_video_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Video>, ApiError> {
    let id = VideoId::from_uuid(parse_uuid(&id, "video ID")?);
    Ok(ApiResponse::ok(state.video_service.get(id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_video_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = VideoId::from_uuid(parse_uuid(&id, "video ID")?);
    state.video_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn validate_video_handler(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> ApiResponse<bool> {
    let accepted = state.video_service.validate_format(&query.filename);
    let message = if accepted {
        "format supported"
    } else {
        "format not supported"
    };
    ApiResponse::ok_with_message(message, accepted)
}
