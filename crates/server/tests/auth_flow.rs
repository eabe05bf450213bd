use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::{self, ServerState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

struct TestApp {
    router: Router,
    data_dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn build_app() -> TestApp {
    let data_dir = std::env::temp_dir().join(format!("postboard_auth_{}", Uuid::new_v4()));
    let state = ServerState::open(&data_dir, "test-secret", 1);
    TestApp { router: routes::build_router(state, cors()), data_dir }
}

async fn send(app: &TestApp, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.router.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

fn alice() -> Value {
    json!({"name": "Alice", "email": "alice@example.com", "password": "secret1", "confirm_password": "secret1"})
}

#[tokio::test]
async fn test_register_and_login_flow() -> anyhow::Result<()> {
    let app = build_app();

    let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(alice())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());

    // stored hash differs from the plaintext
    let raw = tokio::fs::read_to_string(app.data_dir.join("users.json")).await?;
    let users: Value = serde_json::from_str(&raw)?;
    let hash = users[0]["password_hash"].as_str().unwrap_or_default();
    assert!(!hash.is_empty());
    assert_ne!(hash, "secret1");

    let (status, body) = send(&app, "POST", "/api/auth/login", None, Some(json!({"email": "alice@example.com", "password": "secret1"}))).await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["id"], body["user"]["id"]);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_conflicts() -> anyhow::Result<()> {
    let app = build_app();
    send(&app, "POST", "/api/auth/register", None, Some(alice())).await?;
    let mut again = alice();
    again["email"] = json!("ALICE@example.com");
    let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(again)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    Ok(())
}

#[tokio::test]
async fn test_register_validation_errors() -> anyhow::Result<()> {
    let app = build_app();
    let cases = [
        (json!({"name": "A", "email": "a@b.com", "password": "secret1"}), "all fields are required"),
        (json!({"name": "A", "email": "a@b.com", "password": "secret1", "confirm_password": "secret2"}), "passwords do not match"),
        (json!({"name": "A", "email": "a@b", "password": "secret1", "confirm_password": "secret1"}), "invalid email format"),
        (json!({"name": "A", "email": "a@b.com", "password": "short", "confirm_password": "short"}), "password must be at least 6 characters long"),
    ];
    for (body, message) in cases {
        let (status, resp) = send(&app, "POST", "/api/auth/register", None, Some(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["message"], message);
    }
    Ok(())
}

#[tokio::test]
async fn test_signup_alias_accepts_cf_password() -> anyhow::Result<()> {
    let app = build_app();
    let body = json!({"name": "Bob", "email": "bob@example.com", "password": "secret1", "cf_password": "secret1"});
    let (status, _) = send(&app, "POST", "/api/auth/signup", None, Some(body)).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", "/api/auth/signin", None, Some(json!({"email": "bob@example.com", "password": "secret1"}))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_login_failures_look_the_same() -> anyhow::Result<()> {
    let app = build_app();
    send(&app, "POST", "/api/auth/register", None, Some(alice())).await?;

    let (s1, wrong_pw) = send(&app, "POST", "/api/auth/login", None, Some(json!({"email": "alice@example.com", "password": "nope!!"}))).await?;
    let (s2, no_user) = send(&app, "POST", "/api/auth/login", None, Some(json!({"email": "nobody@example.com", "password": "secret1"}))).await?;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, no_user);
    Ok(())
}

#[tokio::test]
async fn test_guard_rejects_bad_tokens() -> anyhow::Result<()> {
    let app = build_app();

    let (status, body) = send(&app, "GET", "/api/posts", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app, "GET", "/api/posts", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // wrong scheme
    let req = Request::builder().uri("/api/posts").header("authorization", "Basic abc").body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // signed with another secret
    let claims = json!({"sub": Uuid::new_v4().to_string(), "role": "user", "iat": 0, "exp": 4_102_444_800u64});
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"other-secret"),
    )?;
    let (status, _) = send(&app, "GET", "/api/posts", Some(&forged), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_a_json_error() -> anyhow::Result<()> {
    let app = build_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["error"], "invalid_body");
    Ok(())
}

#[tokio::test]
async fn test_health_and_openapi_are_public() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/posts"].is_object());
    Ok(())
}
