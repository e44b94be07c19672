//! Router assembly: module routes, built-in endpoints and the middleware stack.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Json, Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, Request, Response, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use ticketdesk_errors::{Problem, not_found};
use tickets::TicketsModule;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{Span, field::Empty, info_span};

use crate::config::AppConfig;
use crate::cors::build_cors_layer;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn fallback() -> Problem {
    not_found("no such route")
}

pub fn build_router(module: &TicketsModule, cfg: &AppConfig) -> Result<Router> {
    let openapi = Arc::new(TicketsModule::openapi());

    let mut router = Router::new()
        .route("/health", get(health))
        .route(
            "/openapi.json",
            get(move || {
                let doc = Arc::clone(&openapi);
                async move { ([(header::CACHE_CONTROL, "no-store")], Json(doc.as_ref().clone())) }
            }),
        );
    router = module.register_rest(router).fallback(fallback);

    apply_middleware_stack(router, cfg)
}

/// Layers are registered innermost first. At runtime a request passes
/// SetRequestId, PropagateRequestId, Trace, Timeout, BodyLimit and CORS
/// before reaching a route.
fn apply_middleware_stack(mut router: Router, cfg: &AppConfig) -> Result<Router> {
    if cfg.cors.enabled {
        router = router.layer(build_cors_layer(&cfg.cors)?);
    }

    router = router
        .layer(RequestBodyLimitLayer::new(cfg.server.body_limit_bytes))
        .layer(DefaultBodyLimit::max(cfg.server.body_limit_bytes));

    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        Duration::from_secs(cfg.server.request_timeout_secs),
    ));

    router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
                span.record("status", res.status().as_u16());
                span.record("latency_ms", latency.as_millis());
            }),
    );

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    Ok(router)
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use sea_orm::Database;
    use ticketdesk_auth::AuthConfig;
    use tickets::TicketsConfig;
    use tower::ServiceExt;

    use super::*;

    async fn router_with(cfg: &AppConfig) -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        TicketsModule::migrate(&db).await.unwrap();
        let module = TicketsModule::init(
            db,
            &AuthConfig::with_secret("http-test-secret"),
            &TicketsConfig::default(),
        )
        .unwrap();
        build_router(&module, cfg).unwrap()
    }

    async fn router() -> Router {
        router_with(&AppConfig::default()).await
    }

    async fn json_body(resp: Response<Body>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public_and_tagged_with_request_id() {
        let resp = router()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(json_body(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn incoming_request_id_is_echoed() {
        let resp = router()
            .await
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.headers()[REQUEST_ID_HEADER], "req-123");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let resp = router()
            .await
            .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let doc = json_body(resp).await;
        assert!(doc["paths"].get("/tickets").is_some());
    }

    #[tokio::test]
    async fn protected_route_without_token_is_unauthorized() {
        let resp = router()
            .await
            .oneshot(Request::get("/tickets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_problem_404() {
        let resp = router()
            .await
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            ticketdesk_errors::APPLICATION_PROBLEM_JSON
        );
    }

    #[tokio::test]
    async fn preflight_is_answered_without_token() {
        let resp = router()
            .await
            .oneshot(
                Request::options("/tickets")
                    .header(header::ORIGIN, "https://desk.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let methods = resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap();
        assert!(methods.contains("PATCH"));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.body_limit_bytes = 16;
        let body = r#"{"name":"someone","email":"someone@example.com","password":"pw"}"#;

        let resp = router_with(&cfg)
            .await
            .oneshot(
                Request::post("/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, body.len())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn invalid_cors_config_fails_router_build() {
        let mut cfg = AppConfig::default();
        cfg.cors.allow_credentials = true;

        let db = Database::connect("sqlite::memory:").await.unwrap();
        let module = TicketsModule::init(
            db,
            &AuthConfig::with_secret("http-test-secret"),
            &TicketsConfig::default(),
        )
        .unwrap();
        assert!(build_router(&module, &cfg).is_err());
    }
}
