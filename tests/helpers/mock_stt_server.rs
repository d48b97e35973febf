use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// What the mock provider saw on one request.
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    pub headers: Vec<(String, String)>,
    pub query: Option<String>,
    /// Text fields by name. The file part is recorded as `file` with its file name.
    pub fields: Vec<(String, String)>,
    pub file_bytes: usize,
}

impl CapturedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct MockState {
    status: u16,
    body: &'static str,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

pub struct MockSttServer {
    pub base_url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockSttServer {
    /// Serves `route` with a fixed status and JSON body.
    pub async fn start(route: &str, status: u16, body: &'static str) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            body,
            captured: Arc::clone(&captured),
        };
        let app = Router::new()
            .route(route, post(handle))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .ok();
        });

        Self {
            base_url: format!("http://{}", addr),
            captured,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

impl Drop for MockSttServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

async fn handle(
    State(state): State<MockState>,
    uri: axum::http::Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut captured = CapturedRequest {
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect(),
        query: uri.query().map(str::to_string),
        ..CapturedRequest::default()
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            captured.file_bytes = bytes;
            captured.fields.push((name, file_name));
        } else {
            let value = field.text().await.unwrap_or_default();
            captured.fields.push((name, value));
        }
    }

    state.captured.lock().unwrap().push(captured);
    let status = StatusCode::from_u16(state.status).unwrap();
    (
        status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}
