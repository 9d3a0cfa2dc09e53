use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rust_blog_backend::config::AppConfig;
use rust_blog_backend::entities::{admins, prelude::*, users};
use rust_blog_backend::infrastructure::database;
use rust_blog_backend::services::auth_service::hash_password;
use rust_blog_backend::utils::auth::decode_session;
use rust_blog_backend::{AppState, create_app};
use sea_orm::{ActiveModelTrait, ColumnTrait, Database, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

async fn setup_state(tmp: &TempDir) -> AppState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let config = AppConfig {
        uploads_root: tmp.path().join("uploads"),
        public_root: tmp.path().to_path_buf(),
        session_secret: "test-secret".to_string(),
        session_max_age_hours: 1,
        maintenance_mode: false,
        allowed_origins: vec![],
    };
    AppState::new(db, config)
}

async fn seed_user(state: &AppState, email: &str, password: &str, is_active: bool) -> String {
    let id = Uuid::new_v4().to_string();
    users::ActiveModel {
        id: Set(id.clone()),
        email: Set(email.to_string()),
        username: Set(email.split('@').next().unwrap().to_string()),
        full_name: Set("Test User".to_string()),
        avatar: Set(None),
        role: Set("USER".to_string()),
        password_hash: Set(hash_password(password).unwrap()),
        is_active: Set(is_active),
        last_login_at: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await
    .unwrap();
    id
}

async fn seed_admin(
    state: &AppState,
    username: &str,
    password: &str,
    locked_until: Option<chrono::DateTime<Utc>>,
    login_attempts: i32,
) -> String {
    let id = Uuid::new_v4().to_string();
    admins::ActiveModel {
        id: Set(id.clone()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        full_name: Set("Test Admin".to_string()),
        avatar: Set(None),
        role: Set("ADMIN".to_string()),
        permissions: Set(serde_json::json!(["files:manage"])),
        password_hash: Set(hash_password(password).unwrap()),
        is_active: Set(true),
        login_attempts: Set(login_attempts),
        locked_until: Set(locked_until),
        last_login_at: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await
    .unwrap();
    id
}

async fn post_json(app: &axum::Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_user_login_success_sets_session_cookie() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    seed_user(&state, "reader@example.com", "password123", true).await;
    let app = create_app(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"email": "reader@example.com", "password": "password123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session_token="));
    assert!(cookie.contains("HttpOnly"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["principal"]["kind"], "user");
    assert_eq!(json["principal"]["role"], "USER");

    // The token decodes back to the same principal shape
    let claims = decode_session(json["token"].as_str().unwrap(), "test-secret").unwrap();
    assert_eq!(claims.principal.role_str(), "USER");
}

#[tokio::test]
async fn test_user_login_updates_last_login() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    let id = seed_user(&state, "reader@example.com", "password123", true).await;
    let app = create_app(state.clone());

    let (status, _) = post_json(
        &app,
        "/api/auth/login",
        r#"{"email": "reader@example.com", "password": "password123"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let user = Users::find_by_id(id).one(&state.db).await.unwrap().unwrap();
    assert!(user.last_login_at.is_some());
}

#[tokio::test]
async fn test_user_login_failures_are_indistinguishable() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    seed_user(&state, "active@example.com", "password123", true).await;
    seed_user(&state, "inactive@example.com", "password123", false).await;
    let app = create_app(state.clone());

    // Wrong password, inactive account, unknown account: same status, same body
    let cases = [
        r#"{"email": "active@example.com", "password": "wrong"}"#,
        r#"{"email": "inactive@example.com", "password": "password123"}"#,
        r#"{"email": "ghost@example.com", "password": "password123"}"#,
    ];

    let mut bodies = Vec::new();
    for case in cases {
        let (status, json) = post_json(&app, "/api/auth/login", case.to_string()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        bodies.push(json["error"].as_str().unwrap().to_string());
    }
    assert!(bodies.iter().all(|b| b == "Invalid credentials"));
}

#[tokio::test]
async fn test_user_login_rejects_malformed_email() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    let app = create_app(state.clone());

    let (status, _) = post_json(
        &app,
        "/api/auth/login",
        r#"{"email": "not-an-email", "password": "x"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_login_success_resets_lockout_bookkeeping() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    let expired_lock = Some(Utc::now() - Duration::hours(1));
    let id = seed_admin(&state, "ops", "s3cret!", expired_lock, 3).await;
    let app = create_app(state.clone());

    let (status, json) = post_json(
        &app,
        "/api/admin/auth/login",
        r#"{"username": "ops", "password": "s3cret!"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["principal"]["kind"], "admin");
    assert_eq!(json["principal"]["role"], "ADMIN");
    assert_eq!(json["principal"]["permissions"][0], "files:manage");

    let admin = Admins::find_by_id(id).one(&state.db).await.unwrap().unwrap();
    assert_eq!(admin.login_attempts, 0);
    assert!(admin.locked_until.is_none());
    assert!(admin.last_login_at.is_some());
}

#[tokio::test]
async fn test_locked_admin_fails_even_with_correct_password() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    let future_lock = Some(Utc::now() + Duration::hours(1));
    seed_admin(&state, "ops", "s3cret!", future_lock, 5).await;
    let app = create_app(state.clone());

    let (status, json) = post_json(
        &app,
        "/api/admin/auth/login",
        r#"{"username": "ops", "password": "s3cret!"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_credential_flows_are_disjoint() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    seed_admin(&state, "ops", "s3cret!", None, 0).await;
    let app = create_app(state.clone());

    // An admin account cannot authenticate through the user flow, even with
    // its email and correct password
    let (status, _) = post_json(
        &app,
        "/api/auth/login",
        r#"{"email": "ops@example.com", "password": "s3cret!"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // And a user account cannot authenticate through the admin flow
    seed_user(&state, "reader@example.com", "password123", true).await;
    let (status, _) = post_json(
        &app,
        "/api/admin/auth/login",
        r#"{"username": "reader", "password": "password123"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_endpoint_round_trip() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    seed_user(&state, "reader@example.com", "password123", true).await;
    let app = create_app(state.clone());

    let (_, login) = post_json(
        &app,
        "/api/auth/login",
        r#"{"email": "reader@example.com", "password": "password123"}"#.to_string(),
    )
    .await;
    let token = login["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/session")
                .header("Cookie", format!("session_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["kind"], "user");
    assert_eq!(json["email"], "reader@example.com");

    // No token at all
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_failed_admin_login_leaves_bookkeeping_untouched() {
    let tmp = TempDir::new().unwrap();
    let state = setup_state(&tmp).await;
    let id = seed_admin(&state, "ops", "s3cret!", None, 0).await;
    let app = create_app(state.clone());

    let (status, _) = post_json(
        &app,
        "/api/admin/auth/login",
        r#"{"username": "ops", "password": "wrong"}"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin = Admins::find()
        .filter(admins::Column::Id.eq(id))
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.login_attempts, 0);
    assert!(admin.locked_until.is_none());
    assert!(admin.last_login_at.is_none());
}
