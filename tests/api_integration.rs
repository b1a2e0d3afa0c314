//! Integration tests for the auth core and the resource routes behind it.
//!
//! Drives the real router in-process with `tower::ServiceExt::oneshot`
//! against a temporary SQLite database per test.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use taskdeck_backend::{
    app::build_router,
    auth::{AuthState, GoogleVerifier, IdentityStore, SessionTokens},
    resources::{ResourceStore, ResourcesState},
};

const TEST_SECRET: &str = "integration-test-secret";

struct TestApp {
    router: Router,
    db_path: String,
    _db: NamedTempFile,
}

fn test_app() -> TestApp {
    let db = NamedTempFile::new().unwrap();
    let db_path = db.path().to_str().unwrap().to_string();

    let auth_state = AuthState {
        identity_store: Arc::new(IdentityStore::new(&db_path).unwrap()),
        session_tokens: Arc::new(SessionTokens::new(TEST_SECRET, 3600)),
        google_verifier: Arc::new(GoogleVerifier::new(
            "client-id-123".to_string(),
            reqwest::Client::new(),
        )),
    };
    let resources_state = ResourcesState {
        store: Arc::new(ResourceStore::new(&db_path).unwrap()),
    };

    TestApp {
        router: build_router(auth_state, resources_state),
        db_path,
        _db: db,
    }
}

async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(router: &Router, name: &str, email: &str, password: &str) -> String {
    let (status, body) = request(
        router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, body) = request(&app.router, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn test_register_then_login() {
    let app = test_app();

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "ada@x.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().unwrap().len() > 0);
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["email"], "ada@x.com");
    // Credential material never leaves the server
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@x.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().unwrap().len() > 0);

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@x.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "success": false, "message": "Unauthorized" }));

    let (status, _) = request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app();
    register(&app.router, "Ada", "ada@x.com", "secret123").await;

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/register",
        None,
        // Same email up to case; the natural key is case-insensitive
        Some(json!({ "name": "Other", "email": "Ada@X.com", "password": "different" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn test_registration_requires_all_fields() {
    let app = test_app();

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "", "email": "ada@x.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    let (status, _) = request(
        &app.router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "ada@x.com", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_registration_token_opens_protected_routes() {
    let app = test_app();
    let token = register(&app.router, "Ada", "ada@x.com", "secret123").await;

    let (status, body) =
        request(&app.router, "GET", "/api/projects", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_bearer_gate_rejections_are_uniform() {
    let app = test_app();

    // No header
    let (status, body) = request(&app.router, "GET", "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "success": false, "message": "Unauthorized" }));

    // Wrong scheme
    let req = Request::builder()
        .method("GET")
        .uri("/api/projects")
        .header(header::AUTHORIZATION, "Token abc123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let (status, _) = request(
        &app.router,
        "GET",
        "/api/projects",
        Some("not.a.token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = test_app();
    register(&app.router, "Ada", "ada@x.com", "secret123").await;

    // A correctly signed token whose expiry is already behind us
    #[derive(serde::Serialize)]
    struct StaleClaims {
        sub: String,
        iat: usize,
        exp: usize,
    }
    let now = chrono::Utc::now().timestamp() as usize;
    let stale = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &StaleClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        },
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, _) = request(&app.router, "GET", "/api/projects", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_identity_rejected() {
    let app = test_app();
    let token = register(&app.router, "Ada", "ada@x.com", "secret123").await;

    // Identity disappears after issuance; the still-valid token must die
    // at the gate.
    let conn = rusqlite::Connection::open(&app.db_path).unwrap();
    conn.execute("DELETE FROM identities", []).unwrap();

    let (status, body) = request(&app.router, "GET", "/api/projects", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn test_project_ownership_gating() {
    let app = test_app();
    let ada = register(&app.router, "Ada", "ada@x.com", "secret123").await;
    let bob = register(&app.router, "Bob", "bob@x.com", "secret456").await;

    let (status, project) = request(
        &app.router,
        "POST",
        "/api/projects",
        Some(&ada),
        Some(json!({ "name": "Apollo", "description": "moonshot" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = project["id"].as_str().unwrap().to_string();

    // Owner sees it
    let uri = format!("/api/projects/{project_id}");
    let (status, body) = request(&app.router, "GET", &uri, Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Apollo");

    // Non-owner gets the exact answer an absent project produces
    let (status, foreign_body) = request(&app.router, "GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let absent_uri = format!("/api/projects/{}", uuid::Uuid::new_v4());
    let (absent_status, absent_body) =
        request(&app.router, "GET", &absent_uri, Some(&ada), None).await;
    assert_eq!(absent_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_body, absent_body);

    // Listing stays owner-scoped
    let (_, ada_projects) = request(&app.router, "GET", "/api/projects", Some(&ada), None).await;
    assert_eq!(ada_projects.as_array().unwrap().len(), 1);
    let (_, bob_projects) = request(&app.router, "GET", "/api/projects", Some(&bob), None).await;
    assert_eq!(bob_projects.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_task_flow_and_per_level_gating() {
    let app = test_app();
    let ada = register(&app.router, "Ada", "ada@x.com", "secret123").await;
    let bob = register(&app.router, "Bob", "bob@x.com", "secret456").await;

    let (_, project) = request(
        &app.router,
        "POST",
        "/api/projects",
        Some(&ada),
        Some(json!({ "name": "Apollo" })),
    )
    .await;
    let project_id = project["id"].as_str().unwrap().to_string();
    let tasks_uri = format!("/api/projects/{project_id}/tasks");

    // Missing title is a bad request
    let (status, body) = request(
        &app.router,
        "POST",
        &tasks_uri,
        Some(&ada),
        Some(json!({ "title": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Task title is required");

    let (status, task) = request(
        &app.router,
        "POST",
        &tasks_uri,
        Some(&ada),
        Some(json!({ "title": "Plan launch" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "Todo");
    let task_id = task["id"].as_str().unwrap().to_string();

    // Bob cannot even list tasks under Ada's project
    let (status, _) = request(&app.router, "GET", &tasks_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Invalid status string is a bad request, not a decode error
    let task_uri = format!("/api/tasks/{task_id}");
    let (status, body) = request(
        &app.router,
        "PATCH",
        &task_uri,
        Some(&ada),
        Some(json!({ "status": "Cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid task status");

    // Bob cannot move Ada's task
    let (status, _) = request(
        &app.router,
        "PATCH",
        &task_uri,
        Some(&bob),
        Some(json!({ "status": "Done" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = request(
        &app.router,
        "PATCH",
        &task_uri,
        Some(&ada),
        Some(json!({ "status": "In Progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "In Progress");

    let (status, body) = request(&app.router, "DELETE", &task_uri, Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");
}

#[tokio::test]
async fn test_delete_project() {
    let app = test_app();
    let ada = register(&app.router, "Ada", "ada@x.com", "secret123").await;

    let (_, project) = request(
        &app.router,
        "POST",
        "/api/projects",
        Some(&ada),
        Some(json!({ "name": "Apollo" })),
    )
    .await;
    let uri = format!("/api/projects/{}", project["id"].as_str().unwrap());

    let (status, body) = request(&app.router, "DELETE", &uri, Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");

    let (status, _) = request(&app.router, "GET", &uri, Some(&ada), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_google_login_rejects_malformed_token() {
    let app = test_app();

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/google",
        None,
        Some(json!({ "token": "not-a-real-identity-token" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid identity token");

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/google",
        None,
        Some(json!({ "token": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Token required");

    // A rejected federated login must leave no identity behind
    let conn = rusqlite::Connection::open(&app.db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM identities", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_password_login_rejected_for_federated_identity() {
    let app = test_app();

    // Seed a federated identity directly through the store
    let store = IdentityStore::new(&app.db_path).unwrap();
    store
        .create(
            "Gmail User",
            "g@x.com",
            taskdeck_backend::auth::models::Credential::Google,
        )
        .unwrap();

    let (status, _) = request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "g@x.com", "password": "anything" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
