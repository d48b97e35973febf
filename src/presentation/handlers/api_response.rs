use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::{SubtitleServiceError, VideoServiceError};

/// Envelope shared by every JSON endpoint. `code` mirrors the HTTP status.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, "success", Some(data))
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.message, "Request rejected");
        }
        ApiResponse::<()>::with_status(self.status, self.message, None).into_response()
    }
}

impl From<SubtitleServiceError> for ApiError {
    fn from(err: SubtitleServiceError) -> Self {
        let status = match &err {
            SubtitleServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            SubtitleServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SubtitleServiceError::Corrupt(_)
            | SubtitleServiceError::Repository(_)
            | SubtitleServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<VideoServiceError> for ApiError {
    fn from(err: VideoServiceError) -> Self {
        let status = match &err {
            VideoServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            VideoServiceError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            VideoServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            VideoServiceError::Repository(_) | VideoServiceError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}
