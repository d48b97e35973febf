use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    delete_subtitle_handler, delete_video_handler, export_subtitle_handler,
    generate_subtitle_handler, get_subtitle_handler, get_video_handler, health_handler,
    list_video_subtitles_handler, list_videos_handler, task_status_handler, upload_video_handler,
    validate_video_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/subtitles/generate", post(generate_subtitle_handler))
        .route("/subtitles/task/{task_id}", get(task_status_handler))
        .route(
            "/subtitles/video/{video_id}",
            get(list_video_subtitles_handler),
        )
        .route(
            "/subtitles/{id}",
            get(get_subtitle_handler).delete(delete_subtitle_handler),
        )
        .route("/subtitles/{id}/export", get(export_subtitle_handler))
        // Upload size is enforced by the video service while streaming.
        .route(
            "/videos/upload",
            post(upload_video_handler).layer(DefaultBodyLimit::disable()),
        )
        .route("/videos/validate", post(validate_video_handler))
        .route("/videos", get(list_videos_handler))
        .route(
            "/videos/{id}",
            get(get_video_handler).delete(delete_video_handler),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
