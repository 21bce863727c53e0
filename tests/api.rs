use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use staffdesk::{
    app::build_app,
    auth::jwt::JwtKeys,
    config::{AppConfig, JwtConfig},
    state::AppState,
};

const TEST_SECRET: &str = "test-secret";

async fn test_app() -> Router {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");

    let config = Arc::new(AppConfig {
        database_url: "sqlite::memory:".into(),
        jwt: JwtConfig {
            secret: TEST_SECRET.into(),
        },
    });

    build_app(AppState::from_parts(db, config))
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse json body")
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn health_is_open() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_list_never_leaks_password() {
    let app = test_app().await;

    let (status, body) = register(&app, "Ada", "ada@co.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["id"], 1);
    assert_eq!(body["account"]["email"], "ada@co.com");
    assert_eq!(body["account"]["role"], "user");
    assert!(body["account"].get("password").is_none());
    assert!(body["account"].get("password_hash").is_none());
    let token = body["token"].as_str().expect("token present").to_string();

    let (status, body) = send(&app, "GET", "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let accounts = body["accounts"].as_array().expect("accounts array");
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["email"], "ada@co.com");
    assert!(accounts[0].get("password").is_none());
    assert!(accounts[0].get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": "ada@co.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_twice_is_duplicate_email() {
    let app = test_app().await;
    let (status, _) = register(&app, "Ada", "ada@co.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);

    // Different name and password; the email alone decides.
    let (status, body) = register(&app, "Someone Else", "ada@co.com", "other-pass").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email address already in use");
}

#[tokio::test]
async fn login_roundtrip_returns_matching_identity() {
    let app = test_app().await;
    register(&app, "Ada", "ada@co.com", "secret123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ada@co.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["id"], 1);
    let token = body["token"].as_str().expect("token").to_string();

    let keys = JwtKeys {
        encoding: jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        decoding: jsonwebtoken::DecodingKey::from_secret(TEST_SECRET.as_bytes()),
    };
    let claims = keys.verify(&token).expect("verify issued token");
    assert_eq!(claims.sub, 1);
    assert_eq!(claims.email, "ada@co.com");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app().await;
    register(&app, "Ada", "ada@co.com", "secret123").await;

    let (wrong_pw_status, wrong_pw_body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ada@co.com", "password": "wrong" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@co.com", "password": "secret123" })),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body, unknown_body);
}

#[tokio::test]
async fn guarded_routes_require_a_valid_token() {
    let app = test_app().await;

    let (status, _) = send(&app, "GET", "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Present but unverifiable tokens are forbidden, not unauthenticated.
    let (status, _) = send(&app, "GET", "/users", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let foreign_keys = JwtKeys {
        encoding: jsonwebtoken::EncodingKey::from_secret(b"some-other-secret"),
        decoding: jsonwebtoken::DecodingKey::from_secret(b"some-other-secret"),
    };
    let forged = foreign_keys.sign(1, "ada@co.com").expect("sign");
    let (status, _) = send(&app, "GET", "/users", Some(&forged), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn any_valid_token_reaches_admin_routes() {
    let app = test_app().await;
    let (_, body) = register(&app, "Ada", "ada@co.com", "secret123").await;
    let token = body["token"].as_str().expect("token").to_string();

    // A freshly registered plain account can create other accounts; no
    // server-side role gate exists.
    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(&token),
        Some(json!({
            "name": "Grace",
            "email": "grace@co.com",
            "password": "hopper42",
            "role": "admin",
            "department": "Engineering"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["role"], "admin");
    assert_eq!(body["account"]["department"], "Engineering");
    assert_eq!(body["account"]["phone"], "");
}

#[tokio::test]
async fn update_email_collision_and_self_update() {
    let app = test_app().await;
    let (_, body) = register(&app, "Ada", "ada@co.com", "secret123").await;
    let token = body["token"].as_str().expect("token").to_string();
    register(&app, "Grace", "grace@co.com", "hopper42").await;

    // Taking another account's email fails.
    let (status, body) = send(
        &app,
        "PUT",
        "/users/2",
        Some(&token),
        Some(json!({ "name": "Grace", "email": "ada@co.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email address already in use");

    // Keeping the current email succeeds; omitted role resets to "user".
    let (status, body) = send(
        &app,
        "PUT",
        "/users/2",
        Some(&token),
        Some(json!({ "name": "Grace Hopper", "email": "grace@co.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["name"], "Grace Hopper");
    assert_eq!(body["account"]["role"], "user");
}

#[tokio::test]
async fn update_unknown_account_is_not_found() {
    let app = test_app().await;
    let (_, body) = register(&app, "Ada", "ada@co.com", "secret123").await;
    let token = body["token"].as_str().expect("token").to_string();

    let (status, _) = send(
        &app,
        "PUT",
        "/users/99",
        Some(&token),
        Some(json!({ "name": "Ghost", "email": "ghost@co.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_can_rotate_password() {
    let app = test_app().await;
    let (_, body) = register(&app, "Ada", "ada@co.com", "secret123").await;
    let token = body["token"].as_str().expect("token").to_string();

    let (status, _) = send(
        &app,
        "PUT",
        "/users/1",
        Some(&token),
        Some(json!({ "name": "Ada", "email": "ada@co.com", "password": "new-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ada@co.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ada@co.com", "password": "new-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_then_profile_is_not_found() {
    let app = test_app().await;
    let (_, body) = register(&app, "Ada", "ada@co.com", "secret123").await;
    let token = body["token"].as_str().expect("token").to_string();

    let (status, body) = send(&app, "DELETE", "/users/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    // The token is still valid, but the account behind it is gone.
    let (status, _) = send(&app, "GET", "/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/users/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
