#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use sheet_console::clients::ApiClient;
use sheet_console::models::Role;
use sheet_console::session::Session;

/// What the mock backend saw and what it should answer.
#[derive(Default)]
pub struct Backend {
    pub authorization: Vec<Option<String>>,
    pub row_queries: Vec<HashMap<String, String>>,
    pub reprocessed: Vec<(i64, u32)>,
    pub mapping: Option<Value>,
    pub uploads: Vec<(String, String, usize)>,
    /// Sheet ids whose reprocess answers 500.
    pub failing_reprocess: Vec<i64>,
    /// Sheet ids whose row listing answers 500.
    pub failing_rows: Vec<i64>,
    /// Sheet ids whose export answers 500.
    pub failing_downloads: Vec<i64>,
}

pub type Shared = Arc<Mutex<Backend>>;

fn record_auth(state: &Shared, headers: &HeaderMap) {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().authorization.push(value);
}

fn sheets_json() -> Value {
    // out of order on purpose
    json!([
        {"id": 12, "sheetName": "C", "sheetIndex": 2, "headersJson": "[\"Z\"]", "totalRows": 1},
        {"id": 10, "sheetName": "A", "sheetIndex": 0, "headersJson": "[\"Region\",\"Amount\"]", "totalRows": 3},
        {"id": 11, "sheetName": "B", "sheetIndex": 1, "headersJson": null, "totalRows": 0}
    ])
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({"token": "tok-1", "username": body["username"], "role": "ADMIN"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"}))).into_response()
    }
}

async fn file(Path(id): Path<i64>) -> Response {
    match id {
        7 => Json(json!({
            "id": 7,
            "fileName": "sales.xlsx",
            "uploadTimestamp": "2024-05-01T10:00:00",
            "totalRows": 4,
            "needsHeaderValidation": true
        }))
        .into_response(),
        // the upload service's own shape: no validation flag
        8 => Json(json!({
            "id": 8,
            "fileName": "orders.xlsx",
            "uploadTimestamp": "2024-05-02T09:30:00",
            "totalProcessedRows": 4
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, "no such file").into_response(),
    }
}

async fn sheets(Path(_id): Path<i64>) -> Json<Value> {
    Json(sheets_json())
}

async fn rows(
    State(state): State<Shared>,
    Path(sheet_id): Path<i64>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record_auth(&state, &headers);
    let failing = {
        let mut backend = state.lock().unwrap();
        backend.row_queries.push(query.clone());
        backend.failing_rows.contains(&sheet_id)
    };
    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "database down"}))).into_response();
    }
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    Json(json!({
        "content": [
            {"id": 1, "sheetIndex": 0, "data": {"Region": "North", "Amount": 12.5}},
            {"id": 2, "sheetIndex": 0, "data": {"Region": "South", "Amount": 3}}
        ],
        "totalElements": 120,
        "totalPages": 3,
        "size": 50,
        "number": page
    }))
    .into_response()
}

async fn download(
    State(state): State<Shared>,
    Path(sheet_id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if state.lock().unwrap().failing_downloads.contains(&sheet_id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "export failed"}))).into_response();
    }
    let keyword = query.get("keyword").cloned().unwrap_or_default();
    format!("export:{}", keyword).into_bytes().into_response()
}

async fn get_mapping(State(state): State<Shared>, Path(_sheet_id): Path<i64>) -> Response {
    match state.lock().unwrap().mapping.clone() {
        Some(mapping) => Json(mapping).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "No mapping"}))).into_response(),
    }
}

async fn save_mapping(State(state): State<Shared>, Path(_sheet_id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    state.lock().unwrap().mapping = Some(body.clone());
    Json(body)
}

async fn templates() -> Json<Value> {
    Json(json!([{
        "id": 3,
        "name": "Sales",
        "description": "monthly export",
        "mappingDefinitionJson": "{\"mappings\":[{\"source\":\"Region\",\"destination\":\"area\"}],\"ignoreUnmapped\":true}"
    }]))
}

async fn create_template(Json(body): Json<Value>) -> Response {
    if body["name"] == "Sales" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "A template named 'Sales' already exists"})),
        )
            .into_response();
    }
    Json(json!({
        "id": 4,
        "name": body["name"],
        "description": body["description"],
        "mappingDefinitionJson": body["mappingDefinition"].to_string()
    }))
    .into_response()
}

async fn apply_template(Path((_sheet_id, template_id)): Path<(i64, i64)>) -> Json<Value> {
    Json(json!({
        "mappings": [{"source": "Region", "destination": format!("fromTemplate{}", template_id)}],
        "ignoreUnmapped": true
    }))
}

async fn preview(Path((_file_id, sheet_index)): Path<(i64, u32)>) -> Json<Value> {
    Json(json!({
        "previewRows": [
            ["Report", format!("sheet {}", sheet_index)],
            ["Region", "Amount"],
            ["North", "12"]
        ]
    }))
}

async fn reprocess(State(state): State<Shared>, Path(sheet_id): Path<i64>, Json(body): Json<Value>) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.failing_reprocess.contains(&sheet_id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "reprocess crashed").into_response();
    }
    let row = body["headerRowIndex"].as_u64().unwrap_or(0) as u32;
    backend.reprocessed.push((sheet_id, row));
    StatusCode::OK.into_response()
}

async fn upload(State(state): State<Shared>, mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        state.lock().unwrap().uploads.push((name, file_name, bytes.len()));
    }
    Json(json!({
        "success": true,
        "message": "File processed",
        "errors": null,
        "processedRows": 4,
        "fileId": 7,
        "needsManualValidation": true
    }))
}

async fn graph(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "labels": ["North", "South"],
        "datasets": [{"label": body["aggregationType"], "data": [2.0, 1.0]}]
    }))
}

async fn users(headers: HeaderMap) -> Response {
    if headers.get("authorization").is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([{"id": 1, "username": "root", "email": "root@example.com", "role": "ADMIN"}])).into_response()
}

pub fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/admin/users", get(users))
        .route("/api/files/:id", get(file))
        .route("/api/files/:id/sheets", get(sheets))
        .route("/api/rows/sheet/:id", get(rows))
        .route("/api/rows/sheet/:id/download", get(download))
        .route("/api/sheets/:id/mapping", get(get_mapping).post(save_mapping))
        .route("/api/sheets/:id/mapping/apply-template/:template", post(apply_template))
        .route("/api/mappings/templates", get(templates).post(create_template))
        .route("/api/preview/file/:file/sheet/:index", get(preview))
        .route("/api/excel/sheet/:id/reprocess", post(reprocess))
        .route("/api/excel/upload", post(upload))
        .route("/api/graphs/sheet/:id", post(graph))
        .with_state(state)
}

/// Serves the mock on an ephemeral port; returns the API base URL.
pub async fn spawn(state: Shared) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}/api", addr)
}

pub fn session() -> Session {
    Session {
        token: "tok-1".into(),
        username: "ops".into(),
        role: Role::Admin,
    }
}

pub async fn backend() -> (Shared, ApiClient) {
    let state = Shared::default();
    let base = spawn(state.clone()).await;
    let client = ApiClient::with_base_urls(&base, &base, Duration::from_secs(5))
        .unwrap()
        .with_session(session());
    (state, client)
}
