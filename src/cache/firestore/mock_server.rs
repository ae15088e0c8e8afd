//! In-process stand-in for the Firestore REST API and Google token endpoint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode as HttpStatus};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

type DocPath = Path<(String, String, String, String)>;

#[derive(Default)]
struct MockState {
    documents: HashMap<String, Value>,
    auth_headers: Vec<String>,
    token_requests: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MockFirestore {
    state: Arc<Mutex<MockState>>,
}

impl MockFirestore {
    pub(crate) fn document(&self, path: &str) -> Option<Value> {
        self.state.lock().unwrap().documents.get(path).cloned()
    }

    pub(crate) fn insert_raw(&self, path: &str, fields: Value) {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(path.to_string(), fields);
    }

    pub(crate) fn auth_headers(&self) -> Vec<String> {
        self.state.lock().unwrap().auth_headers.clone()
    }

    pub(crate) fn token_requests(&self) -> usize {
        self.state.lock().unwrap().token_requests
    }

    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.state.lock().unwrap().auth_headers.push(value);
    }
}

fn rpc_error(status: HttpStatus, name: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {"code": status.as_u16(), "message": message, "status": name}
        })),
    )
        .into_response()
}

/// Collections with special behaviour: `forbidden` always answers 403 and
/// `slow` stalls long enough for callers to time out.
async fn guard(collection: &str) -> Option<Response> {
    match collection {
        "forbidden" => Some(rpc_error(
            HttpStatus::FORBIDDEN,
            "PERMISSION_DENIED",
            "Missing or insufficient permissions.",
        )),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            None
        }
        _ => None,
    }
}

async fn get_document(
    State(mock): State<MockFirestore>,
    Path((project, database, collection, id)): DocPath,
    headers: HeaderMap,
) -> Response {
    mock.record_auth(&headers);
    if let Some(resp) = guard(&collection).await {
        return resp;
    }
    let path = format!("{project}/{database}/{collection}/{id}");
    match mock.document(&path) {
        Some(fields) => Json(json!({
            "name": format!("projects/{project}/databases/{database}/documents/{collection}/{id}"),
            "fields": fields,
        }))
        .into_response(),
        None => rpc_error(
            HttpStatus::NOT_FOUND,
            "NOT_FOUND",
            &format!("Document \"{path}\" not found."),
        ),
    }
}

async fn set_document(
    State(mock): State<MockFirestore>,
    Path((project, database, collection, id)): DocPath,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.record_auth(&headers);
    if let Some(resp) = guard(&collection).await {
        return resp;
    }
    let fields = body.get("fields").cloned().unwrap_or_else(|| json!({}));
    mock.insert_raw(&format!("{project}/{database}/{collection}/{id}"), fields.clone());
    Json(json!({"fields": fields})).into_response()
}

async fn delete_document(
    State(mock): State<MockFirestore>,
    Path((project, database, collection, id)): DocPath,
    headers: HeaderMap,
) -> Response {
    mock.record_auth(&headers);
    if let Some(resp) = guard(&collection).await {
        return resp;
    }
    mock.state
        .lock()
        .unwrap()
        .documents
        .remove(&format!("{project}/{database}/{collection}/{id}"));
    Json(json!({})).into_response()
}

async fn token(State(mock): State<MockFirestore>, Form(form): Form<HashMap<String, String>>) -> Response {
    let grant_ok = form.get("grant_type").map(String::as_str)
        == Some("urn:ietf:params:oauth:grant-type:jwt-bearer");
    if !grant_ok || !form.contains_key("assertion") {
        return (
            HttpStatus::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        )
            .into_response();
    }
    mock.state.lock().unwrap().token_requests += 1;
    Json(json!({
        "access_token": "test-access-token",
        "expires_in": 3600,
        "token_type": "Bearer",
    }))
    .into_response()
}

async fn token_denied() -> Response {
    (
        HttpStatus::UNAUTHORIZED,
        Json(json!({"error": "invalid_grant", "error_description": "Invalid JWT Signature."})),
    )
        .into_response()
}

/// Start the mock on an ephemeral port and return its base URL.
pub(crate) async fn spawn_mock() -> (String, MockFirestore) {
    let mock = MockFirestore::default();
    let app = Router::new()
        .route(
            "/v1/projects/{project}/databases/{database}/documents/{collection}/{id}",
            get(get_document).patch(set_document).delete(delete_document),
        )
        .route("/token", post(token))
        .route("/token-denied", post(token_denied))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), mock)
}
