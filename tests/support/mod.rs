//! In-process stand-in for the REST backend plus a running portal in front of it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Router,
};
use serde_json::Value;

use blood_portal::config::Config;
use blood_portal::{app, AppState};

#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct Shared {
    replies: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
    hits: Mutex<Vec<Hit>>,
}

pub struct MockBackend {
    pub url: String,
    shared: Arc<Shared>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let router = Router::new().fallback(record).with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            url: format!("http://{addr}/api"),
            shared,
        }
    }

    /// Registers the reply for `method path`, where `path` is relative to the API root.
    pub fn reply(&self, method: Method, path: &str, status: StatusCode, body: Value) -> &Self {
        self.shared
            .replies
            .lock()
            .unwrap()
            .insert((method, format!("/api{path}")), (status, body));
        self
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.shared.hits.lock().unwrap().clone()
    }

    pub fn hits_to(&self, method: Method, path: &str) -> Vec<Hit> {
        let full = format!("/api{path}");
        self.hits()
            .into_iter()
            .filter(|h| h.method == method && h.path == full)
            .collect()
    }
}

async fn record(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    shared.hits.lock().unwrap().push(Hit {
        method: method.clone(),
        path: uri.path().to_string(),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let reply = shared
        .replies
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();
    match reply {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "success": false, "message": "Route not found" })),
        )
            .into_response(),
    }
}

/// Starts the portal against `backend_url` and returns its base URL.
pub async fn start_portal(backend_url: &str) -> String {
    let vars: HashMap<&str, String> = HashMap::from([
        ("BACKEND_URL", backend_url.to_string()),
        ("BACKEND_TIMEOUT_SECS", "5".to_string()),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let router = app(AppState::new(config).unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}
