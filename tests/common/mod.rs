#![allow(dead_code)]

use aspen_lite::config::CacheConfig;
use aspen_lite::db::models::ImportRecord;
use aspen_lite::db::{DirectoryStorage, OpenMode};
use aspen_lite::router::{AspenState, aspen_router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use serde_json::Value;
use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

pub struct TestDb {
    pub path: PathBuf,
    pub url: String,
    pub storage: DirectoryStorage,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "aspen-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

/// Fresh database file with the schema applied.
pub async fn test_db(tag: &str) -> TestDb {
    let path = temp_db_path(tag);
    let url = format!("sqlite:{}", path.display());
    let storage = DirectoryStorage::connect(&url, OpenMode::Create, 4)
        .await
        .expect("failed to open test database");
    storage.init_schema().await.expect("failed to init schema");
    TestDb { path, url, storage }
}

/// Database seeded through the bulk import path.
pub async fn seeded_db(tag: &str, records: &[ImportRecord]) -> TestDb {
    let db = test_db(tag).await;
    db.storage
        .import_records(records)
        .await
        .expect("import failed");
    db
}

pub fn app(db: &TestDb) -> Router {
    aspen_router(AspenState::new(db.storage.clone(), CacheConfig::default()))
}

pub fn record(
    student_id: &str,
    first_name: &str,
    last_name: &str,
    grade: i64,
    gender: &str,
    ethnicity: &str,
    school: &str,
) -> ImportRecord {
    ImportRecord {
        student_id: student_id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        grade,
        gender: gender.to_string(),
        ethnicity: ethnicity.to_string(),
        school: school.to_string(),
        address: Some("700 S State St".to_string()),
        zip_code: Some("60605".to_string()),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn cache_control(&self) -> Option<&str> {
        self.headers
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await
}

pub async fn post_json(app: &Router, uri: &str, payload: &str) -> TestResponse {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("failed to build request"),
    )
    .await
}

/// `studentId`s of a students array, in response order.
pub fn student_ids(body: &Value) -> Vec<String> {
    body["students"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|s| s["studentId"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
