#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use student_portal::api::{ApiClient, API_KEY_HEADER};
use student_portal::config::BackendConfig;
use student_portal::session::Session;
use student_portal::storage::{MemoryStorage, Storage};

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    api_key: String,
    routes: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
    requests: Mutex<Vec<Recorded>>,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the academic records service.
///
/// Every route except `/health` demands the configured `x-api-key` and
/// answers 401 otherwise. Unregistered routes answer 404.
pub struct MockService {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockService {
    pub async fn start(api_key: &str) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind mock service on {}", port))?;

        let state = Arc::new(MockState {
            api_key: api_key.to_string(),
            ..MockState::default()
        });
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}/", port),
            state,
        })
    }

    /// Answer `method path` with `status` and `body` from now on
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        lock(&self.state.routes).insert((method, path.to_string()), (status, body));
    }

    pub fn ok(&self, path: &str, body: Value) {
        self.respond(Method::GET, path, 200, body);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        lock(&self.state.requests).clone()
    }

    pub fn last_request(&self) -> Option<Recorded> {
        lock(&self.state.requests).last().cloned()
    }

    /// Client with a fresh in-memory session, logged in when `api_key` is given
    pub fn client(&self, api_key: Option<&str>) -> Result<(Arc<Session>, ApiClient)> {
        self.client_with_storage(Arc::new(MemoryStorage::new()), api_key)
    }

    pub fn client_with_storage(
        &self,
        storage: Arc<dyn Storage>,
        api_key: Option<&str>,
    ) -> Result<(Arc<Session>, ApiClient)> {
        let session = Arc::new(Session::hydrate(storage)?);
        if let Some(key) = api_key {
            session.login(key)?;
        }
        let client = ApiClient::new(&BackendConfig::with_base_url(&self.base_url), session.clone())?;
        Ok((session, client))
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let path = uri.path().to_string();

    lock(&state.requests).push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        api_key: api_key.clone(),
        body: serde_json::from_slice(&body).ok(),
    });

    if path != "/health" && api_key.as_deref() != Some(state.api_key.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid API key" }))).into_response();
    }

    match lock(&state.routes).get(&(method, path)).cloned() {
        Some((status, body)) if body.is_null() => status.into_response(),
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
    }
}

/// Fresh directory under the system temp dir
pub fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("student-portal-test-{}", uuid::Uuid::new_v4()))
}
