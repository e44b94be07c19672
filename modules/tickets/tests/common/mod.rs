#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use ticketdesk_auth::{AuthConfig, Role, TokenIssuer};
use tickets::{TicketsConfig, TicketsModule};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

pub fn auth_config() -> AuthConfig {
    AuthConfig::with_secret(SECRET)
}

/// Fresh migrated in-memory database. A single connection keeps every query
/// on the same in-memory instance.
pub async fn inmem_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    TicketsModule::migrate(&db).await.expect("migrate");
    db
}

pub fn app_with(db: DatabaseConnection, cfg: &TicketsConfig) -> Router {
    TicketsModule::init(db, &auth_config(), cfg)
        .expect("init tickets module")
        .register_rest(Router::new())
}

pub async fn app() -> Router {
    let cfg = TicketsConfig {
        bcrypt_cost: 4,
        ..TicketsConfig::default()
    };
    app_with(inmem_db().await, &cfg)
}

pub fn token_for(user_id: i64, role: Role) -> String {
    TokenIssuer::new(&auth_config())
        .issue(user_id, role)
        .expect("issue token")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
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
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Signs up a user over HTTP, logs in and returns `(user_id, token)`.
pub async fn signup_and_login(app: &Router, email: &str) -> (i64, String) {
    let (status, _) = send(
        app,
        "POST",
        "/signup",
        None,
        Some(serde_json::json!({"name": "Test User", "email": email, "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(serde_json::json!({"email": email, "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        body["user"]["userID"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_owned(),
    )
}

pub fn new_ticket_body(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "description": "details",
        "ticketType": "support",
        "severity": 2,
        "priority": 3
    })
}
