//! End-to-end router tests over in-memory stores.
//!
//! Each test assembles the full API router with mock stores, drives it with
//! `tower::ServiceExt::oneshot`, and asserts on the JSON envelopes.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use capitolwatch_api::auth::AuthTokens;
use capitolwatch_api::http::{api_router, AppState};
use capitolwatch_api::repo::docs::mock::MockDocStore;
use capitolwatch_api::store::mock::{ItemBuilder, MockItemStore};
use capitolwatch_api::store::QueryOutput;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    items: Arc<MockItemStore>,
    docs: Arc<MockDocStore>,
}

fn test_app() -> TestApp {
    let items = Arc::new(MockItemStore::new());
    let docs = Arc::new(MockDocStore::new());
    let tokens = Arc::new(AuthTokens::from_seed(&[7u8; 32], 7_200));

    let state = AppState {
        items: items.clone(),
        docs: docs.clone(),
        tokens,
    };
    TestApp {
        router: api_router(state),
        items,
        docs,
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

// ============================================================================
// Domain routes
// ============================================================================

#[tokio::test]
async fn bill_detail_echoes_id_and_sorts_actions() {
    let app = test_app();
    app.items.put(
        "HR1234",
        vec![ItemBuilder::new()
            .s("bill_id", "HR1234")
            .s("bill_title", "An act to test")
            .s("congress", "117")
            .s("introduced_date", "2021-01-05")
            .s("latest_major_action_date", "2021-03-18")
            .gz("summary", "A summary of the act.")
            .gz_set(
                "actions",
                &[
                    "1@house@2021-01-05@Introduced in House",
                    "2@house@2021-02-10@Passed House",
                ],
            )
            .build()],
    );

    let (status, body) = send(app.router, get("/api/v1/bills/bill/billID/HR1234")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["billID"], "HR1234");
    assert_eq!(body["billTitle"], "An act to test");
    assert_eq!(body["introduced"], "January 5, 2021");
    assert_eq!(body["summary"], "A summary of the act.");
    assert_eq!(body["actions"][0]["id"], 2);
    assert_eq!(body["actions"][1]["id"], 1);
}

#[tokio::test]
async fn missing_legislator_renders_unified_error() {
    let app = test_app();

    let (status, body) = send(
        app.router,
        get("/api/v1/legislators/legislator/summary/Z999"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "status": "error", "error": "Legislator not found." })
    );
}

#[tokio::test]
async fn malformed_coordinates_are_rejected() {
    let app = test_app();

    let (status, body) = send(app.router, get("/api/v1/legislators/locDists/chicago")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn global_vote_listing_renders_cursor() {
    let app = test_app();
    app.items.push_page(QueryOutput {
        items: vec![ItemBuilder::new()
            .s("roll_id", "h2021-144")
            .s("bill_title", "An act to test")
            .s("chamber", "house")
            .s("question", "On Passage")
            .s("result", "Passed")
            .build()],
        last_key: Some(
            ItemBuilder::new()
                .s("roll_id", "h2021-144")
                .s("voted_at", "2021-05-12")
                .s("blank", " ")
                .build(),
        ),
    });

    let (status, body) = send(app.router, get("/api/v1/votes/all")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["votes"][0]["rollID"], "h2021-144");
    assert_eq!(
        body["lastEvaluatedKey"],
        json!({ "rollID": "h2021-144", "votedAt": "2021-05-12" })
    );
}

#[tokio::test]
async fn committee_members_resolve_to_roster_entries() {
    let app = test_app();
    app.items.put(
        "HSAG",
        vec![ItemBuilder::new()
            .s("committee_id", "HSAG")
            .s("name", "agriculture")
            .ss("currentMembers", &["K000377"])
            .build()],
    );
    app.items.put(
        "K000377",
        vec![ItemBuilder::new()
            .s("bioguide_id", "K000377")
            .s("first_name", "Robin")
            .s("last_name", "Kelly")
            .s("party", "D")
            .s("state", "IL")
            .s("district", "2")
            .s("chamber", "house")
            .build()],
    );

    let (status, body) = send(
        app.router,
        get("/api/v1/committees/committee/committeeID/HSAG/members"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Agriculture");
    assert_eq!(body["currentMembers"][0]["bioguideID"], "K000377");
    assert_eq!(body["currentMembers"][0]["state"], "Illinois");
    assert_eq!(body["currentMembers"][0]["position"], "Representative");
}

// ============================================================================
// Auth flow
// ============================================================================

#[tokio::test]
async fn register_login_and_identity_echo() {
    let app = test_app();

    let (status, registered) = send(
        app.router.clone(),
        post_json(
            "/api/v1/auth/register",
            &json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered["name"], "Ada");
    assert_eq!(registered["expiresIn"], 7_200);
    assert!(registered["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, session) = send(
        app.router.clone(),
        post_json(
            "/api/v1/auth/login",
            &json!({ "email": "ada@example.com", "password": "hunter2" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = session["token"].as_str().expect("token").to_string();

    let (status, user) = send(
        app.router,
        get_authed("/api/v1/auth/user", &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["id"], registered["id"]);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app();
    let body = json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2" });

    let (status, _) = send(
        app.router.clone(),
        post_json("/api/v1/auth/register", &body, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = send(
        app.router,
        post_json("/api/v1/auth/register", &body, None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["error"], "Email address already exists.");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = test_app();

    send(
        app.router.clone(),
        post_json(
            "/api/v1/auth/register",
            &json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2" }),
            None,
        ),
    )
    .await;

    let (status, body) = send(
        app.router,
        post_json(
            "/api/v1/auth/login",
            &json!({ "email": "ada@example.com", "password": "hunter3" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid login.");
}

// ============================================================================
// Follows
// ============================================================================

async fn registered_token(app: &TestApp) -> String {
    let (_, session) = send(
        app.router.clone(),
        post_json(
            "/api/v1/auth/register",
            &json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2" }),
            None,
        ),
    )
    .await;
    session["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn follow_routes_require_a_token() {
    let app = test_app();

    let (status, body) = send(app.router, get("/api/v1/following/getBills")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authorized.");
}

#[tokio::test]
async fn follow_create_find_and_duplicate() {
    let app = test_app();
    let token = registered_token(&app).await;

    let (status, created) = send(
        app.router.clone(),
        post_json(
            "/api/v1/following/createBill",
            &json!({ "followingID": "HR1234" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["followingID"], "HR1234");

    let (status, body) = send(
        app.router.clone(),
        post_json(
            "/api/v1/following/createBill",
            &json!({ "followingID": "HR1234" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already created.");

    let (status, found) = send(
        app.router.clone(),
        get_authed("/api/v1/following/findBill/HR1234", &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["status"], "found");

    // A follow of one kind does not leak into another kind's lookup.
    let (_, missing) = send(
        app.router,
        get_authed("/api/v1/following/findNomination/HR1234", &token),
    )
    .await;
    assert_eq!(missing["status"], "not found");
}

#[tokio::test]
async fn follow_list_and_delete() {
    let app = test_app();
    let token = registered_token(&app).await;

    for id in ["HR1", "HR2"] {
        send(
            app.router.clone(),
            post_json(
                "/api/v1/following/createBill",
                &json!({ "followingID": id }),
                Some(&token),
            ),
        )
        .await;
    }

    let (_, listing) = send(
        app.router.clone(),
        get_authed("/api/v1/following/getBills", &token),
    )
    .await;
    assert_eq!(listing["following"].as_array().expect("array").len(), 2);

    let (status, body) = send(
        app.router.clone(),
        Request::builder()
            .method(Method::DELETE)
            .uri("/api/v1/following/deleteBill/HR1")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, listing) = send(
        app.router,
        get_authed("/api/v1/following/getBills", &token),
    )
    .await;
    assert_eq!(listing["following"], json!([{ "followingID": "HR2" }]));
}

#[tokio::test]
async fn district_lookup_spans_both_stores() {
    let app = test_app();
    app.docs.set_point_hits(&["IL-2"]);
    app.items.put(
        "IL",
        vec![ItemBuilder::new()
            .s("bioguide_id", "K000377")
            .s("state", "IL")
            .s("district", "2")
            .build()],
    );

    let (status, body) = send(
        app.router,
        get("/api/v1/legislators/locDists/-87.6,41.8"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["reps"],
        json!([{ "district": "IL-2", "bioguideID": "K000377" }])
    );
}

#[tokio::test]
async fn health_check_responds() {
    let app = test_app();
    let (status, _) = send(app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}
