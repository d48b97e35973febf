use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use tower::ServiceExt;

use subtitler::infrastructure::observability::{
    DEFAULT_LOG_FILTER, REQUEST_ID_HEADER, RequestId, TracingConfig, request_id_middleware,
};

fn echo_router() -> Router {
    Router::new()
        .route(
            "/echo",
            get(|Extension(id): Extension<RequestId>| async move { id.0 }),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn given_incoming_request_id_when_handled_then_it_is_echoed_and_visible_to_handlers() {
    let response = echo_router()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    let body = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    assert_eq!(&body[..], b"req-42");
}

#[tokio::test]
async fn given_no_request_id_when_handled_then_a_uuid_is_generated() {
    let response = echo_router()
        .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let generated = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[test]
fn given_blank_filter_when_building_config_then_default_filter_is_used() {
    let config = TracingConfig::new("Test", true, Some("  ".to_string()));

    assert_eq!(config.filter, DEFAULT_LOG_FILTER);
    assert!(config.json_format);
    assert_eq!(config.environment, "Test");
}

#[test]
fn given_explicit_filter_when_building_config_then_it_is_kept() {
    let config = TracingConfig::new("Local", false, Some("warn".to_string()));

    assert_eq!(config.filter, "warn");
}
