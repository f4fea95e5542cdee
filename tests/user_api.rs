//! End-to-end tests of the user API over the in-memory backend

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

use titan_user_service::api::create_router;
use titan_user_service::config::ServerConfig;
use titan_user_service::create_in_memory_app_state;

fn app() -> Router {
    create_router(create_in_memory_app_state(), &ServerConfig::default(), None)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

fn john() -> Value {
    json!({
        "first_name": "John",
        "last_name": "Lennon",
        "email": "john@example.com",
        "password": "imagine1971"
    })
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, "POST", "/api/user", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"].clone()
}

#[tokio::test]
async fn test_create_then_get() {
    let app = app();

    let (status, created) = send(&app, "POST", "/api/user", Some(john())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created["message"],
        "operation from handler: CreateUser, successful."
    );
    assert_eq!(created["data"]["role"], "user");
    assert!(created["data"].get("password").is_none());

    let id = created["data"]["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/user/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"], created["data"]);
}

#[tokio::test]
async fn test_create_validation_error() {
    let app = app();
    let mut body = john();
    body["password"] = json!("short");

    let (status, json) = send(&app, "POST", "/api/user", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["type"], "invalid_request_error");
    assert_eq!(json["error"]["code"], "password_too_short");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = app();
    create(&app, john()).await;

    let (status, json) = send(&app, "POST", "/api/user", Some(john())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "email_already_exists");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/user")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_pagination_and_errors() {
    let app = app();

    let (status, json) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "users_not_found");

    for i in 0..12 {
        let mut body = john();
        body["email"] = json!(format!("member{i}@example.com"));
        create(&app, body).await;
    }

    let (status, first) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"].as_array().unwrap().len(), 10);
    assert_eq!(first["data"][0]["email"], "member0@example.com");

    let (status, second) = send(&app, "GET", "/api/users?page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"].as_array().unwrap().len(), 2);
    assert_eq!(second["data"][1]["email"], "member11@example.com");

    let (status, _) = send(&app, "GET", "/api/users?page=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, "GET", "/api/users?page=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "invalid_page_number");

    let (status, _) = send(&app, "GET", "/api/users?page=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_and_delete_lifecycle() {
    let app = app();
    let user = create(&app, john()).await;
    let uri = format!("/api/user/{}", user["id"].as_str().unwrap());

    let (status, json) = send(&app, "PATCH", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "at_least_one_param_required");

    let (status, patched) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "last_name": "Ono", "email": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["data"]["last_name"], "Ono");
    assert_eq!(patched["data"]["email"], "john@example.com");
    assert_eq!(patched["data"]["created_at"], user["created_at"]);

    let (status, deleted) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        deleted["message"],
        "operation from handler: DeleteUser, successful."
    );
    assert_eq!(deleted["data"]["last_name"], "Ono");

    for method in ["GET", "DELETE"] {
        let (status, json) = send(&app, method, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(json["error"]["code"], "user_not_found");
    }

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "first_name": "Johnny" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the address is free again once its owner is deleted
    create(&app, john()).await;
}

#[tokio::test]
async fn test_patch_to_taken_email_is_conflict() {
    let app = app();
    create(&app, john()).await;
    let paul = create(
        &app,
        json!({
            "first_name": "Paul",
            "last_name": "McCartney",
            "email": "paul@example.com",
            "password": "yesterday65"
        }),
    )
    .await;

    let uri = format!("/api/user/{}", paul["id"].as_str().unwrap());
    let (status, json) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "email": "john@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["param"], "email");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");

    let (status, json) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["checks"][0]["name"], "user_storage");

    let (status, _) = send(&app, "GET", "/live", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = app();

    let request = Request::builder()
        .uri("/live")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}
