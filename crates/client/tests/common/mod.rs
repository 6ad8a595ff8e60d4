#![allow(dead_code)]

//! In-process mock of the validation backend.
//!
//! Serves the REST contract on an ephemeral port with just enough behavior
//! for contract tests: a single valid bearer token, an in-memory project
//! table and a configurable subscription payload.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use saasprobe_client::{AuthContext, SaasApi, TokenStore};

pub const VALID_TOKEN: &str = "test-token";
pub const VALID_PASSWORD: &str = "correct-horse";
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug)]
pub struct MockState {
    pub requests: Vec<SeenRequest>,
    pub projects: Vec<Value>,
    pub subscription: Value,
    /// Answer the subscription endpoint with a 500.
    pub subscription_fails: bool,
    next_id: i64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            projects: Vec::new(),
            subscription: json!({ "status": "none" }),
            subscription_fails: false,
            next_id: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.lock().requests.clone()
    }

    /// Insert a project row and return its id.
    pub fn insert_project(&self, name: &str, status: &str) -> i64 {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.projects.push(project_json(id, name, status));
        id
    }
}

pub fn project_json(id: i64, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "keywords": null,
        "status": status,
        "created_at": "2024-05-01T12:00:00.123456",
        "updated_at": null
    })
}

fn user_json(email: &str, full_name: Option<&str>) -> Value {
    json!({
        "id": 1,
        "email": email,
        "full_name": full_name,
        "subscription_tier": "free",
        "created_at": "2024-05-01T12:00:00"
    })
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {VALID_TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(detail(
            StatusCode::UNAUTHORIZED,
            "Could not validate credentials",
        )),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn record_request(State(backend): State<MockBackend>, request: Request, next: Next) -> Response {
    let seen = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        SeenRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header("authorization"),
            request_id: header("x-request-id"),
        }
    };
    backend.lock().requests.push(seen);
    next.run(request).await
}

async fn register(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if email == TAKEN_EMAIL {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    (
        StatusCode::CREATED,
        Json(user_json(email, body["full_name"].as_str())),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"].as_str() == Some(VALID_PASSWORD) {
        Json(json!({ "access_token": VALID_TOKEN, "token_type": "bearer" })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect email or password")
    }
}

async fn me(headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    Json(user_json("founder@example.com", Some("Founder"))).into_response()
}

async fn list_projects(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    Json(Value::Array(backend.lock().projects.clone())).into_response()
}

async fn create_project(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let mut state = backend.lock();
    let id = state.next_id;
    state.next_id += 1;
    let mut project = project_json(id, body["name"].as_str().unwrap_or_default(), "pending");
    project["description"] = body.get("description").cloned().unwrap_or(Value::Null);
    project["keywords"] = body.get("keywords").cloned().unwrap_or(Value::Null);
    state.projects.push(project.clone());
    (StatusCode::CREATED, Json(project)).into_response()
}

async fn get_project(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let state = backend.lock();
    match state.projects.iter().find(|p| p["id"] == id) {
        Some(project) => {
            let mut body = project.clone();
            body["analysis"] = Value::Null;
            Json(body).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Project not found"),
    }
}

async fn delete_project(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let mut state = backend.lock();
    let before = state.projects.len();
    state.projects.retain(|p| p["id"] != id);
    if state.projects.len() == before {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn validate_project(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let mut state = backend.lock();
    let Some(project) = state.projects.iter_mut().find(|p| p["id"] == id) else {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    };
    if project["status"] == "processing" {
        return detail(StatusCode::BAD_REQUEST, "Project is already being processed");
    }
    project["status"] = json!("pending");
    Json(json!({ "status": "queued", "task_id": "task-abc", "project_id": id })).into_response()
}

async fn subscription(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let state = backend.lock();
    if state.subscription_fails {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Stripe unavailable");
    }
    Json(state.subscription.clone()).into_response()
}

async fn checkout(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let plan = body["plan"].as_str().unwrap_or_default();
    Json(json!({ "checkout_url": format!("https://checkout.stripe.test/{plan}") })).into_response()
}

async fn cancel(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&headers) {
        return resp;
    }
    let state = backend.lock();
    if state.subscription["status"] != "active" {
        return detail(StatusCode::BAD_REQUEST, "No active subscription");
    }
    Json(json!({ "status": "cancellation_scheduled" })).into_response()
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub fn router(backend: MockBackend) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{id}", get(get_project).delete(delete_project))
        .route("/projects/{id}/validate", post(validate_project))
        .route("/stripe/subscription", get(subscription))
        .route("/stripe/create-checkout-session", post(checkout))
        .route("/stripe/cancel-subscription", post(cancel))
        .layer(middleware::from_fn_with_state(backend.clone(), record_request))
        .with_state(backend)
}

/// Serve the mock on `127.0.0.1:0` and return its base URL.
pub async fn spawn_backend(backend: MockBackend) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(backend);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Client pointed at `base_url`, with its session loaded from `store`.
pub fn client(base_url: &str, store: impl TokenStore + 'static) -> SaasApi {
    let auth = AuthContext::load(store).unwrap();
    SaasApi::with_client(reqwest::Client::new(), base_url.to_string(), auth)
}
