use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use http_body_util::BodyExt;
use ticketdesk_auth::{
    AuthConfig, Role, TokenIssuer, TokenVerifier,
    axum_ext::{Authenticated, require_identity},
};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt; // for `oneshot`

const SECRET: &str = "middleware-test-secret";

async fn whoami(Authenticated(identity): Authenticated) -> impl IntoResponse {
    format!("{}:{}", identity.user_id, identity.role)
}

fn app() -> Router {
    let verifier = Arc::new(TokenVerifier::new(&AuthConfig::with_secret(SECRET)));
    Router::new()
        .route("/whoami", get(whoami).options(|| async { "preflight ok" }))
        .layer(middleware::from_fn_with_state(verifier, require_identity))
}

async fn send(request: Request<Body>) -> (StatusCode, String, Option<String>) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap(), content_type)
}

fn get_with_auth(value: &str) -> Request<Body> {
    Request::builder()
        .uri("/whoami")
        .header("Authorization", value)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn valid_token_attaches_identity() {
    let token = TokenIssuer::new(&AuthConfig::with_secret(SECRET))
        .issue(12, Role::Admin)
        .unwrap();

    let (status, body, _) = send(get_with_auth(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "12:admin");
}

#[tokio::test]
async fn missing_token_is_unauthorized_problem() {
    let request = Request::builder()
        .uri("/whoami")
        .body(Body::empty())
        .unwrap();

    let (status, body, content_type) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    let problem: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(problem["status"], 401);
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let (status, _, _) = send(get_with_auth("Token abc")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_signature_is_forbidden() {
    let token = TokenIssuer::new(&AuthConfig::with_secret("another-secret"))
        .issue(12, Role::User)
        .unwrap();

    let (status, body, _) = send(get_with_auth(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!body.contains("signature"), "sub-reason must not leak: {body}");
}

#[tokio::test]
async fn expired_token_is_forbidden() {
    let issued = OffsetDateTime::now_utc() - Duration::days(3);
    let token = TokenIssuer::new(&AuthConfig::with_secret(SECRET))
        .issue_at(12, Role::User, issued)
        .unwrap();

    let (status, body, _) = send(get_with_auth(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!body.contains("expired token: "));
}

#[tokio::test]
async fn alg_none_token_is_forbidden() {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD
        .encode(r#"{"sub":"1","iss":"ticketdesk","userType":"admin","iat":0,"exp":9999999999}"#);
    let (status, _, _) = send(get_with_auth(&format!("Bearer {header}.{payload}."))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn garbage_token_is_forbidden() {
    let (status, _, _) = send(get_with_auth("Bearer not-a-jwt")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn preflight_skips_the_gate() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/whoami")
        .header("Origin", "https://app.example.com")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();

    let (status, body, _) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "preflight ok");
}

#[tokio::test]
async fn extractor_without_gate_is_internal_error() {
    let app = Router::new().route("/whoami", get(whoami));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
