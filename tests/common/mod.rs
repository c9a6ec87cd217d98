#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use limefit::{
    build_app, db, models::user::CreateUserPayload, services::user_service, session_layer,
    state::AppState,
};
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

pub const ADMIN_PASSWORD: &str = "admin123";

/// App completa sobre SQLite em memória (uma ligação) e sessões em memória.
pub async fn spawn_app() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::run_migrations(&pool).await.expect("Failed to migrate");

    let app = build_app(
        AppState {
            db_pool: pool.clone(),
        },
        session_layer(MemoryStore::default(), false, 1),
    );
    (app, pool)
}

pub async fn seed_user(pool: &SqlitePool, dni: i64, username: &str, password: &str, admin: bool) {
    user_service::create_user(
        pool,
        CreateUserPayload {
            dni,
            username: username.to_string(),
            password: password.to_string(),
            name: username.to_string(),
            surname: "Teste".to_string(),
            email: format!("{}@limefit.test", username),
            sex: String::new(),
            admin,
        },
    )
    .await
    .expect("Failed to seed user");
}

/// Envia um pedido e devolve (status, corpo JSON ou Null, set-cookie).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
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
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json, set_cookie)
}

/// Faz login e devolve o cookie de sessão.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, _, cookie) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {}", username);
    cookie.expect("login must set a session cookie")
}

/// Admin semeado diretamente na base de dados e já autenticado.
pub async fn admin_session(app: &Router, pool: &SqlitePool) -> String {
    seed_user(pool, 1, "admin", ADMIN_PASSWORD, true).await;
    login(app, "admin", ADMIN_PASSWORD).await
}
