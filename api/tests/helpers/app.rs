#![allow(dead_code)]

use std::sync::Arc;

use api::routes::app;
use api::state::AppState;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use db::documents::MemoryDocumentStore;
use db::models::{lecturer, student, user};
use db::test_utils::{create_lecturer, create_student, create_user, setup_test_db};
use db::rbac::RoleName;
use serde_json::Value;
use services::token::{TokenIssuer, TokenSettings};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

/// A fully wired router over an in-memory database and document store.
///
/// Seeded accounts (all with password [`PASSWORD`]):
/// - `admin`
/// - `advisor` (lecturer) advising `alice`
/// - `other_lecturer` (lecturer) with no advisees
/// - `alice` (student)
/// - `bob` (student, no advisor)
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryDocumentStore>,
    pub admin: user::Model,
    pub advisor: (user::Model, lecturer::Model),
    pub other_lecturer: (user::Model, lecturer::Model),
    pub alice: (user::Model, student::Model),
    pub bob: (user::Model, student::Model),
    _uploads: TempDir,
}

pub fn test_tokens() -> TokenIssuer {
    TokenIssuer::new(&TokenSettings {
        access_secret: "test-access-secret".into(),
        refresh_secret: "test-refresh-secret".into(),
        access_ttl: Duration::minutes(15),
        refresh_ttl: Duration::days(1),
    })
}

pub async fn make_test_app() -> TestApp {
    let db = setup_test_db().await;

    let admin = create_user(&db, "admin", RoleName::Admin).await;
    let advisor = create_lecturer(&db, "advisor").await;
    let other_lecturer = create_lecturer(&db, "other_lecturer").await;
    let alice = create_student(&db, "alice", Some(&advisor.1.id)).await;
    let bob = create_student(&db, "bob", None).await;

    let store = Arc::new(MemoryDocumentStore::new());
    let uploads = TempDir::new().expect("Failed to create upload dir");
    let state = AppState::new(db, store.clone(), test_tokens(), uploads.path());

    TestApp {
        router: app(state.clone()),
        state,
        store,
        admin,
        advisor,
        other_lecturer,
        alice,
        bob,
        _uploads: uploads,
    }
}

impl TestApp {
    /// Sends a request and returns the status and parsed JSON body
    /// (`Value::Null` for empty or non-JSON bodies).
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn login(&self, username: &str) -> String {
        let (status, json) = self
            .send(json_request("POST", "/api/v1/auth/login", None, &serde_json::json!({
                "username": username,
                "password": PASSWORD,
            })))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed for {username}: {json}");
        json["data"]["access_token"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(empty_request("GET", uri, Some(token))).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(empty_request("DELETE", uri, Some(token))).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: &Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, Some(token), body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: &Value) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, Some(token), body)).await
    }

    /// Creates a draft as `token` and returns its id.
    pub async fn create_achievement(&self, token: &str, title: &str, kind: &str) -> String {
        let (status, json) = self
            .post(
                "/api/v1/achievements",
                token,
                &serde_json::json!({ "title": title, "achievement_type": kind }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a `multipart/form-data` request with one part per `(field, file name, bytes)`.
pub fn multipart_request(uri: &str, token: &str, files: &[(&str, &str, &[u8])]) -> Request<Body> {
    const BOUNDARY: &str = "X-TEST-BOUNDARY";

    let mut body = Vec::new();
    for (field, name, bytes) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}
