//! End-to-end API tests
//!
//! Drive the router over the in-memory store with `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use keygate::auth::AuthService;
use keygate::routes;
use keygate::state::AppState;
use keygate::store::MemoryStore;
use keygate::users::UserService;

fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let auth_service = Arc::new(AuthService::new(
        store.clone(),
        "test-secret".to_string(),
        900,
        7,
    ));
    let user_service = Arc::new(UserService::new(store, 4));

    Router::new()
        .merge(routes::auth_routes())
        .merge(routes::user_routes())
        .with_state(AppState::new(auth_service, user_service))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn signup(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/v1/user",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/v1/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn signup_login_and_introspect() {
    let app = test_app();

    let (status, user) = signup(&app, "a@x.com", "password1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "a@x.com");
    assert_eq!(user["role"], "tenant");
    assert!(user.get("password_hash").is_none());

    let (status, tokens) = login(&app, "a@x.com", "password1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tokens["token_type"], "Bearer");
    let access_token = tokens["access_token"].as_str().unwrap();
    assert!(!access_token.is_empty());
    assert!(!tokens["refresh_token"].as_str().unwrap().is_empty());

    let (status, claims) = send(&app, Method::GET, "/v1/session", Some(access_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(claims["email"], "a@x.com");
    assert_eq!(claims["sub"], user["id"]);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = test_app();

    signup(&app, "a@x.com", "password1").await;
    let (status, body) = signup(&app, "a@x.com", "password2").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_signup_is_rejected() {
    let app = test_app();

    let (status, _) = signup(&app, "not-an-email", "password1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = signup(&app, "a@x.com", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = test_app();

    signup(&app, "a@x.com", "password1").await;
    let (status, body) = login(&app, "a@x.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // Unknown email gets the same response shape.
    let (status, other) = login(&app, "b@x.com", "password1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(other["error"]["message"], body["error"]["message"]);
}

#[tokio::test]
async fn refresh_reissues_the_access_token_only() {
    let app = test_app();

    signup(&app, "a@x.com", "password1").await;
    let (_, tokens) = login(&app, "a@x.com", "password1").await;
    let refresh_token = tokens["refresh_token"].as_str().unwrap();

    let (status, refreshed) = send(
        &app,
        Method::POST,
        "/v1/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["refresh_token"], tokens["refresh_token"]);

    let new_access = refreshed["access_token"].as_str().unwrap();
    let (status, claims) = send(&app, Method::GET, "/v1/session", Some(new_access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(claims["email"], "a@x.com");
}

#[tokio::test]
async fn logout_revokes_and_is_idempotent() {
    let app = test_app();

    signup(&app, "a@x.com", "password1").await;
    let (_, tokens) = login(&app, "a@x.com", "password1").await;
    let access_token = tokens["access_token"].as_str().unwrap();

    let (status, _) = send(&app, Method::POST, "/v1/logout", Some(access_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/v1/session", Some(access_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::POST, "/v1/logout", Some(access_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn profile_and_password_change() {
    let app = test_app();

    signup(&app, "a@x.com", "password1").await;
    let (_, tokens) = login(&app, "a@x.com", "password1").await;
    let access_token = tokens["access_token"].as_str().unwrap();

    let (status, profile) = send(&app, Method::GET, "/v1/user", Some(access_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "a@x.com");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/v1/user",
        Some(access_token),
        Some(json!({ "password": "password2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "a@x.com", "password1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "a@x.com", "password2").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_the_account_kills_its_tokens() {
    let app = test_app();

    signup(&app, "a@x.com", "password1").await;
    let (_, tokens) = login(&app, "a@x.com", "password1").await;
    let access_token = tokens["access_token"].as_str().unwrap();

    let (status, _) = send(&app, Method::DELETE, "/v1/user", Some(access_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/v1/session", Some(access_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = login(&app, "a@x.com", "password1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app();

    let (status, _) = send(&app, Method::GET, "/v1/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/v1/session", None, None).await;
    // No bearer header at all: rejected before the service is consulted.
    assert_ne!(status, StatusCode::OK);
}
