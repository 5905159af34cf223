//! End-to-end API integration tests
//!
//! These tests drive the full router over the in-memory store:
//! - Registration, login and both credential schemes
//! - Self-service profile updates and account deactivation
//! - Admin user listing and deletion
//! - Example resource CRUD, pagination and filtering
//! - Status codes and error bodies for every failure class

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use base64::Engine as _;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for oneshot

use keystone_api::app::{build_router, AppState};
use keystone_api::application::users::{self, Registration};
use keystone_api::config::AppConfig;
use keystone_api::domain::user::{Email, Password, Username};

const PASSWORD: &str = "SecurePass123";
const ADMIN_PASSWORD: &str = "AdminPass123";

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("valid test config")
}

/// Setup test application over fresh in-memory stores
fn setup_app() -> Router {
    build_router(AppState::in_memory(test_config()))
}

/// Setup test application with a bootstrap admin account
async fn setup_app_with_admin() -> Router {
    let state = AppState::in_memory(test_config());
    let registration = Registration {
        username: Username::new("admin").unwrap(),
        email: Email::new("admin@example.com").unwrap(),
        password: Password::new(ADMIN_PASSWORD).unwrap(),
    };
    users::ensure_admin(state.users.as_ref(), &state.hasher, registration)
        .await
        .expect("admin bootstrap");

    build_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    authorization: Option<String>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body, challenge)
}

fn bearer(token: &str) -> Option<String> {
    Some(format!("Bearer {}", token))
}

fn basic(login: &str, password: &str) -> Option<String> {
    Some(format!("Basic {}", STANDARD.encode(format!("{}:{}", login, password))))
}

async fn register(app: &Router, username: &str) -> Value {
    let (status, body, _) = send(
        app,
        Method::POST,
        "/auth/register",
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username.to_lowercase()),
            "password": PASSWORD,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body, _) = send(
        app,
        Method::POST,
        "/auth/login",
        Some(json!({ "username": username, "password": password })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_resource(app: &Router, payload: Value) -> Value {
    let (status, body, _) = send(app, Method::POST, "/examples", Some(payload), None).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}

#[tokio::test]
async fn test_health_and_root() {
    let app = setup_app();

    let (status, body, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));

    let (status, body, _) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to Keystone API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_register_returns_public_profile() {
    let app = setup_app();

    let body = register(&app, "JohnDoe").await;

    assert_eq!(body["username"], "johndoe");
    assert_eq!(body["email"], "johndoe@example.com");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["is_admin"], false);
    assert!(body["id"].is_string());
    assert!(body["created_at"].is_string());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicates_conflict() {
    let app = setup_app();
    register(&app, "johndoe").await;

    let (status, body, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        Some(json!({
            "username": "JOHNDOE",
            "email": "other@example.com",
            "password": PASSWORD,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");

    let (status, body, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        Some(json!({
            "username": "janedoe",
            "email": "JohnDoe@Example.com",
            "password": PASSWORD,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = setup_app();

    let cases = [
        json!({ "username": "jo", "email": "jo@example.com", "password": PASSWORD }),
        json!({ "username": "johndoe", "email": "not-an-email", "password": PASSWORD }),
        json!({ "username": "johndoe", "email": "john@example.com", "password": "weak" }),
        json!({ "username": "johndoe", "email": "john@example.com", "password": "alllowercase1" }),
        json!({ "username": "johndoe", "email": "john@example.com", "password": PASSWORD, "is_admin": true }),
        json!({ "username": "johndoe", "email": "john@example.com" }),
    ];

    for payload in cases {
        let (status, body, _) =
            send(&app, Method::POST, "/auth/register", Some(payload.clone()), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "payload {}", payload);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_login_and_me_with_both_schemes() {
    let app = setup_app();
    let registered = register(&app, "johndoe").await;

    let token = login(&app, "johndoe", PASSWORD).await;
    let (status, body, _) = send(&app, Method::GET, "/auth/me", None, bearer(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], registered["id"]);

    let (status, body, _) = send(
        &app,
        Method::GET,
        "/auth/me",
        None,
        basic("johndoe@example.com", PASSWORD),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], registered["id"]);

    let by_email = login(&app, "johndoe@example.com", PASSWORD).await;
    let (status, _, _) = send(&app, Method::GET, "/auth/me", None, bearer(&by_email)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let app = setup_app();
    register(&app, "johndoe").await;

    let (status, body, challenge) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({ "username": "johndoe", "password": "WrongPass123" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect username or password");
    assert!(challenge.is_some());

    let (status, _, challenge) = send(&app, Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(challenge.is_some());

    let (status, body, _) =
        send(&app, Method::GET, "/auth/me", None, bearer("not.a.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Could not validate credentials");

    let (status, _, _) = send(
        &app,
        Method::GET,
        "/auth/me",
        None,
        basic("johndoe", "WrongPass123"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        Method::GET,
        "/auth/me",
        None,
        Some("Digest abc".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_me() {
    let app = setup_app();
    register(&app, "johndoe").await;
    let token = login(&app, "johndoe", PASSWORD).await;

    let (status, body, _) = send(
        &app,
        Method::PATCH,
        "/auth/me",
        Some(json!({ "email": "New@Example.com" })),
        bearer(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["username"], "johndoe");

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/auth/me",
        Some(json!({ "password": "NewSecure456" })),
        bearer(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    login(&app, "johndoe", "NewSecure456").await;

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/auth/me",
        Some(json!({ "email": null })),
        bearer(&token),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/auth/me",
        Some(json!({ "is_admin": true })),
        bearer(&token),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_me_email_conflict() {
    let app = setup_app();
    register(&app, "johndoe").await;
    register(&app, "janedoe").await;
    let token = login(&app, "johndoe", PASSWORD).await;

    let (status, body, _) = send(
        &app,
        Method::PATCH,
        "/auth/me",
        Some(json!({ "email": "janedoe@example.com" })),
        bearer(&token),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already in use");
}

#[tokio::test]
async fn test_deactivated_account_is_forbidden() {
    let app = setup_app();
    register(&app, "johndoe").await;
    let token = login(&app, "johndoe", PASSWORD).await;

    let (status, body, _) = send(
        &app,
        Method::PATCH,
        "/auth/me",
        Some(json!({ "is_active": false })),
        bearer(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, body, _) = send(&app, Method::GET, "/auth/me", None, bearer(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Inactive user account");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({ "username": "johndoe", "password": PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = setup_app_with_admin().await;
    register(&app, "johndoe").await;
    let token = login(&app, "johndoe", PASSWORD).await;

    let (status, body, _) = send(&app, Method::GET, "/auth/users", None, bearer(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin privileges required");

    let (status, _, _) = send(&app, Method::GET, "/auth/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_and_filters_users() {
    let app = setup_app_with_admin().await;
    register(&app, "johndoe").await;
    register(&app, "janedoe").await;
    register(&app, "bobsmith").await;
    let token = login(&app, "admin", ADMIN_PASSWORD).await;

    let (status, body, _) = send(&app, Method::GET, "/auth/users", None, bearer(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["page"], 1);
    assert_eq!(body["size"], 50);
    assert_eq!(body["items"].as_array().unwrap().len(), 4);

    let (status, body, _) = send(
        &app,
        Method::GET,
        "/auth/users?username=DOE&size=1",
        None,
        bearer(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, body, _) = send(
        &app,
        Method::GET,
        "/auth/users?email=bob&is_active=true",
        None,
        basic("admin", ADMIN_PASSWORD),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["username"], "bobsmith");
}

#[tokio::test]
async fn test_admin_delete_user() {
    let app = setup_app_with_admin().await;
    let john = register(&app, "johndoe").await;
    let john_token = login(&app, "johndoe", PASSWORD).await;
    let admin_token = login(&app, "admin", ADMIN_PASSWORD).await;

    let (_, me, _) = send(&app, Method::GET, "/auth/me", None, bearer(&admin_token)).await;
    let (status, body, _) = send(
        &app,
        Method::DELETE,
        &format!("/auth/users/{}", me["id"].as_str().unwrap()),
        None,
        bearer(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Cannot delete your own account");

    let uri = format!("/auth/users/{}", john["id"].as_str().unwrap());
    let (status, body, _) = send(&app, Method::DELETE, &uri, None, bearer(&admin_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _, _) = send(&app, Method::DELETE, &uri, None, bearer(&admin_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Token outlives the account but no longer resolves to a user
    let (status, _, _) = send(&app, Method::GET, "/auth/me", None, bearer(&john_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        Method::DELETE,
        "/auth/users/not-a-uuid",
        None,
        bearer(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_resource_crud_flow() {
    let app = setup_app();

    let created = create_resource(
        &app,
        json!({ "name": "  Widget  ", "description": "A widget", "value": 12.5 }),
    )
    .await;
    assert_eq!(created["name"], "Widget");
    assert_eq!(created["description"], "A widget");
    assert_eq!(created["value"], json!(12.5));
    assert_eq!(created["is_active"], true);
    let uri = format!("/examples/{}", created["id"].as_str().unwrap());

    let (status, fetched, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body, _) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let (status, _, _) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resource_partial_update() {
    let app = setup_app();
    let created = create_resource(
        &app,
        json!({ "name": "Widget", "description": "A widget", "value": 3 }),
    )
    .await;
    let uri = format!("/examples/{}", created["id"].as_str().unwrap());

    let (status, body, _) =
        send(&app, Method::PATCH, &uri, Some(json!({ "name": "Gadget" })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Gadget");
    assert_eq!(body["description"], "A widget");
    assert_eq!(body["value"], json!(3.0));
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["created_at"], created["created_at"]);

    let (status, body, _) =
        send(&app, Method::PATCH, &uri, Some(json!({ "description": null })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["name"], "Gadget");

    let (status, unchanged, _) = send(&app, Method::PATCH, &uri, Some(json!({})), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, body);

    let (status, _, _) = send(&app, Method::PATCH, &uri, Some(json!({ "name": null })), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) =
        send(&app, Method::PATCH, &uri, Some(json!({ "colour": "red" })), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/examples/00000000-0000-4000-8000-000000000000",
        Some(json!({ "name": "Ghost" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resource_validation() {
    let app = setup_app();

    let cases = [
        json!({ "name": "" }),
        json!({ "name": "   " }),
        json!({ "name": "x".repeat(101) }),
        json!({ "name": "Widget", "description": "d".repeat(501) }),
        json!({ "name": "Widget", "value": -1 }),
        json!({ "name": "Widget", "owner": "me" }),
        json!({ "description": "no name" }),
    ];

    for payload in cases {
        let (status, body, _) =
            send(&app, Method::POST, "/examples", Some(payload.clone()), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "payload {}", payload);
        assert!(body["error"].is_string());
    }

    let (status, _, _) = send(&app, Method::GET, "/examples/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_resource_pagination() {
    let app = setup_app();
    let mut created = Vec::new();
    for i in 0..25 {
        let body = create_resource(&app, json!({ "name": format!("Item {}", i) })).await;
        let created_at: DateTime<Utc> = body["created_at"].as_str().unwrap().parse().unwrap();
        created.push((created_at, body["id"].as_str().unwrap().to_string()));
    }
    // Newest first, ties broken by ascending id
    created.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let (status, body, _) = send(&app, Method::GET, "/examples?page=2&size=10", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 25);
    assert_eq!(body["page"], 2);
    assert_eq!(body["size"], 10);
    assert_eq!(body["pages"], 3);
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    let expected: Vec<&str> = created[10..20].iter().map(|(_, id)| id.as_str()).collect();
    assert_eq!(ids, expected);

    let (_, last, _) = send(&app, Method::GET, "/examples?page=3&size=10", None, None).await;
    assert_eq!(last["items"].as_array().unwrap().len(), 5);

    let (_, beyond, _) = send(&app, Method::GET, "/examples?page=9&size=10", None, None).await;
    assert_eq!(beyond["total"], 25);
    assert!(beyond["items"].as_array().unwrap().is_empty());

    for uri in ["/examples?page=0", "/examples?size=0", "/examples?size=101", "/examples?page=abc"] {
        let (status, _, _) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "uri {}", uri);
    }
}

#[tokio::test]
async fn test_resource_pages_do_not_overlap() {
    let app = setup_app();
    for i in 0..15 {
        create_resource(&app, json!({ "name": format!("Item {}", i) })).await;
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (_, body, _) = send(
            &app,
            Method::GET,
            &format!("/examples?page={}&size=5", page),
            None,
            None,
        )
        .await;
        for item in body["items"].as_array().unwrap() {
            seen.push(item["id"].as_str().unwrap().to_string());
        }
    }

    let total = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(total, 15);
    assert_eq!(seen.len(), 15);
}

#[tokio::test]
async fn test_resource_filters() {
    let app = setup_app();
    create_resource(&app, json!({ "name": "Blue Widget" })).await;
    create_resource(&app, json!({ "name": "Red widget", "is_active": false })).await;
    create_resource(&app, json!({ "name": "Gadget" })).await;

    let (_, body, _) = send(&app, Method::GET, "/examples?name=WIDGET", None, None).await;
    assert_eq!(body["total"], 2);

    let (_, body, _) = send(&app, Method::GET, "/examples?is_active=false", None, None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Red widget");

    let (_, body, _) = send(
        &app,
        Method::GET,
        "/examples?name=widget&is_active=true",
        None,
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Blue Widget");
}
