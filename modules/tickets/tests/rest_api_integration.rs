#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the tickets REST surface over an in-memory database.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use ticketdesk_auth::Role;

use common::{app, new_ticket_body, send, signup_and_login, token_for};

#[tokio::test]
async fn signup_login_create_resolve_flow() {
    let app = app().await;

    let (status, user) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"name": "Ann", "email": "a@b.c", "password": "p", "userType": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "a@b.c");
    assert_eq!(user["userType"], "user");
    assert!(user.get("password").is_none());

    let (status, login) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "a@b.c", "password": "p"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().unwrap().to_owned();
    assert!(!token.is_empty());

    let (status, ticket) = send(
        &app,
        "POST",
        "/tickets",
        Some(&token),
        Some(json!({
            "title": "Printer",
            "description": "jammed",
            "ticketType": "support",
            "severity": 2,
            "priority": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["status"], "pending");
    assert_eq!(ticket["creatorID"], user["userID"]);
    let id = ticket["ticketID"].as_i64().unwrap();

    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/tickets/{id}"),
        Some(&token),
        Some(json!([{"op": "update", "path": "status", "value": "resolved"}])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "resolved");
    assert!(patched["resolvedAt"].is_string());

    let (status, changes) = send(&app, "GET", "/changes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let changes = changes.as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["ticketID"], id);
    assert_eq!(changes[0]["to"], "resolved");
}

#[tokio::test]
async fn malformed_owner_patch_leaves_ticket_unchanged() {
    let app = app().await;
    let (_, token) = signup_and_login(&app, "owner@b.c").await;

    let (_, ticket) = send(&app, "POST", "/tickets", Some(&token), Some(new_ticket_body("t"))).await;
    let id = ticket["ticketID"].as_i64().unwrap();

    let (status, problem) = send(
        &app,
        "PATCH",
        &format!("/tickets/{id}"),
        Some(&token),
        Some(json!([
            {"op": "update", "path": "status", "value": "in_progress"},
            {"op": "update", "path": "ownerID", "value": "not-an-int"}
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "invalid owner id");

    let (_, after) = send(&app, "GET", &format!("/tickets/{id}"), Some(&token), None).await;
    assert_eq!(after["status"], "pending");
    assert_eq!(after["ownerID"], serde_json::Value::Null);
    assert_eq!(after["version"], ticket["version"]);

    let (_, changes) = send(&app, "GET", "/changes", Some(&token), None).await;
    assert!(changes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn patch_applies_operations_in_order() {
    let app = app().await;
    let (_, token) = signup_and_login(&app, "order@b.c").await;
    let (_, ticket) = send(&app, "POST", "/tickets", Some(&token), Some(new_ticket_body("t"))).await;
    let id = ticket["ticketID"].as_i64().unwrap();

    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/tickets/{id}"),
        Some(&token),
        Some(json!([
            {"op": "update", "path": "status", "value": "resolved"},
            {"op": "update", "path": "ownerID", "value": 77},
            {"op": "update", "path": "title", "value": "ignored"},
            {"op": "update", "path": "status", "value": "in_progress"}
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "in_progress");
    assert_eq!(patched["ownerID"], 77);
    assert_eq!(patched["title"], "t");
    assert_eq!(patched["resolvedAt"], serde_json::Value::Null);
    assert_eq!(patched["version"], 2);
}

#[tokio::test]
async fn patch_errors() {
    let app = app().await;
    let (_, token) = signup_and_login(&app, "errs@b.c").await;
    let (_, ticket) = send(&app, "POST", "/tickets", Some(&token), Some(new_ticket_body("t"))).await;
    let uri = format!("/tickets/{}", ticket["ticketID"]);

    let cases = [
        (json!([]), "nothing to update"),
        (
            json!([{"op": "update", "path": "title", "value": "x"}]),
            "nothing to update",
        ),
        (
            json!([{"op": "remove", "path": "status", "value": "resolved"}]),
            "invalid patch operation: remove",
        ),
        (
            json!([{"op": "update", "path": "status", "value": "closed"}]),
            "invalid status",
        ),
        (json!([{"op": "update", "path": "status"}]), "missing patch value"),
    ];
    for (body, detail) in cases {
        let (status, problem) = send(&app, "PATCH", &uri, Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{detail}");
        assert_eq!(problem["detail"], detail);
    }

    // A malformed patch is rejected before the ticket lookup
    let (status, _) = send(
        &app,
        "PATCH",
        "/tickets/999",
        Some(&token),
        Some(json!([{"op": "bogus", "path": "status", "value": "x"}])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PATCH",
        "/tickets/999",
        Some(&token),
        Some(json!([{"op": "update", "path": "status", "value": "resolved"}])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_validation_errors_are_bad_request() {
    let app = app().await;
    let token = token_for(5, Role::User);

    let (status, problem) = send(
        &app,
        "POST",
        "/tickets",
        Some(&token),
        Some(json!({"title": "t", "description": "d", "ticketType": "bug", "severity": 1, "priority": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "invalid type: unknown value 'bug'");

    let (status, problem) = send(
        &app,
        "POST",
        "/tickets",
        Some(&token),
        Some(json!({"description": "d"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "missing title");
}

#[tokio::test]
async fn non_json_body_is_a_problem_document() {
    let app = app().await;
    let token = token_for(5, Role::User);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/tickets")
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::from("title=t"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        response.headers()["content-type"],
        ticketdesk_errors::APPLICATION_PROBLEM_JSON
    );
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let app = app().await;
    let (ann, ann_token) = signup_and_login(&app, "ann@b.c").await;
    let (_, bob_token) = signup_and_login(&app, "bob@b.c").await;

    for (token, title) in [(&ann_token, "a1"), (&bob_token, "b1"), (&ann_token, "a2")] {
        let (status, _) = send(&app, "POST", "/tickets", Some(token), Some(new_ticket_body(title))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(&app, "GET", "/tickets", Some(&ann_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert!(
        page["tickets"]
            .as_array()
            .unwrap()
            .iter()
            .all(|t| t["creatorID"] == ann)
    );

    let admin = token_for(1000, Role::Admin);
    let (_, page) = send(&app, "GET", "/tickets", Some(&admin), None).await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["last"], 3);

    let (_, page) = send(&app, "GET", "/tickets?after_id=2", Some(&admin), None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["tickets"][0]["ticketID"], 3);

    let (_, page) = send(&app, "GET", "/tickets?after_id=3", Some(&admin), None).await;
    assert_eq!(page, json!({"tickets": [], "last": 0, "total": 0}));
}

#[tokio::test]
async fn invalid_cursor_and_path_ids() {
    let app = app().await;
    let token = token_for(5, Role::User);

    let (status, problem) = send(&app, "GET", "/tickets?after_id=abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "invalid pagination start id");

    let (status, problem) = send(&app, "GET", "/tickets?after_id=-5", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "invalid pagination start id");

    let (status, problem) = send(&app, "GET", "/tickets/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "invalid ticket id");
}

#[tokio::test]
async fn other_users_tickets_are_not_found() {
    let app = app().await;
    let (_, ann_token) = signup_and_login(&app, "ann@b.c").await;
    let (_, bob_token) = signup_and_login(&app, "bob@b.c").await;

    let (_, ticket) = send(&app, "POST", "/tickets", Some(&ann_token), Some(new_ticket_body("t"))).await;
    let uri = format!("/tickets/{}", ticket["ticketID"]);

    let (status, _) = send(&app, "GET", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PATCH",
        &uri,
        Some(&bob_token),
        Some(json!([{"op": "update", "path": "status", "value": "resolved"}])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let admin = token_for(1000, Role::Admin);
    let (status, fetched) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "t");
}

#[tokio::test]
async fn access_gate_statuses() {
    let app = app().await;

    let (status, problem) = send(&app, "GET", "/tickets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(problem["status"], 401);

    let (status, problem) = send(&app, "GET", "/changes", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!problem.to_string().contains("signature"));

    let forged = ticketdesk_auth::TokenIssuer::new(&ticketdesk_auth::AuthConfig::with_secret(
        "someone-elses-secret",
    ))
    .issue(1, Role::Admin)
    .unwrap();
    let (status, _) = send(&app, "GET", "/tickets", Some(&forged), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // public routes need no token
    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "nobody@b.c", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn account_errors() {
    let app = app().await;
    signup_and_login(&app, "dup@b.c").await;

    let (status, problem) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"name": "Again", "email": "DUP@b.c", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["code"], "EMAIL_ALREADY_EXISTS");

    let (status, wrong_pw) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "dup@b.c", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_pw["detail"], "invalid credentials");

    let (status, problem) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"name": "No Mail", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["detail"], "missing email");
}
