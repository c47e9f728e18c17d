//! In-process fakes of the Mowen backend for tests.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::config::MowenConfig;
use crate::mowen::MowenClient;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Default)]
struct Backend {
    responses: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

async fn replay(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    backend.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });

    let (status, body) = backend
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((500, r#"{"error":"unexpected request"}"#.to_string()));
    let status = StatusCode::from_u16(status).unwrap();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Answers every request, whatever its path, with the next canned
/// `(status, body)` and records what it received.
pub struct FakeServer {
    pub base_url: String,
    backend: Arc<Backend>,
}

impl FakeServer {
    pub async fn start(responses: Vec<(u16, String)>) -> Self {
        Self::start_with(|_| responses).await
    }

    /// Like `start`, but the responses may refer to the server's own URL.
    pub async fn start_with<F>(make_responses: F) -> Self
    where
        F: FnOnce(&str) -> Vec<(u16, String)>,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let backend = Arc::new(Backend {
            responses: Mutex::new(make_responses(&base_url).into()),
            requests: Mutex::default(),
        });

        let app = Router::new()
            .fallback(replay)
            .with_state(Arc::clone(&backend));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { base_url, backend }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.backend.requests.lock().unwrap().clone()
    }

    pub fn client(&self) -> MowenClient {
        self.client_with_timeout(5)
    }

    pub fn client_with_timeout(&self, timeout_secs: u64) -> MowenClient {
        client_for(&self.base_url, timeout_secs)
    }
}

/// Accepts connections and never answers them.
pub struct SilentServer {
    pub base_url: String,
    connections: Arc<AtomicUsize>,
}

impl SilentServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&connections);
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                open.push(stream);
            }
        });

        Self {
            base_url,
            connections,
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

pub fn client_for(base_url: &str, timeout_secs: u64) -> MowenClient {
    MowenClient::new(&MowenConfig {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        timeout_secs,
    })
    .unwrap()
}
