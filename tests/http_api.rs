#[path = "common/mod.rs"]
mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt; // for oneshot

use cocofarm::{
    build_router,
    session::SESSION_COOKIE_NAME,
    state::create_session,
    totp::{DEFAULT_ISSUER, build_totp},
};
use common::ADMIN_EMAIL;

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={t}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_req(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={t}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn login_page_and_protected_routes() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let app = build_router(Arc::new(ctx.state.clone()));

    let (status, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("login-form"));

    let (status, _) = send(&app, get("/api/trees", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, get("/me", Some("not-a-session"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn totp_login_sets_session_cookie() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let app = build_router(Arc::new(ctx.state.clone()));

    let (status, _) = send(
        &app,
        json_req("POST", "/login", None, json!({ "email": ADMIN_EMAIL, "code": "000000x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let code = build_totp(DEFAULT_ISSUER, ADMIN_EMAIL, &ctx.admin_secret)
        .unwrap()
        .generate_current()
        .unwrap();
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/login",
            None,
            json!({ "email": ADMIN_EMAIL, "code": code }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    let token = cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("session="))
        .unwrap()
        .to_string();

    let (status, body) = send(&app, get("/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let me: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(me["role"], "admin");

    let (status, body) = send(&app, get("/me/totp", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let totp: Value = serde_json::from_slice(&body).unwrap();
    assert!(totp["otpauth_url"].as_str().unwrap().starts_with("otpauth://totp/"));

    let (status, _) = send(&app, json_req("POST", "/logout", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get("/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn json_crud_respects_roles() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let admin_id = ctx.admin.user_id().copied().unwrap();
    let (_, worker) = common::add_worker(&ctx, "W1", "w1@cocofarm.test").await;
    let admin_token = create_session(&ctx.state, &admin_id).await.unwrap();
    let worker_token = create_session(&ctx.state, &worker.id.unwrap()).await.unwrap();
    let app = build_router(Arc::new(ctx.state.clone()));

    let owner = json!({
        "name": "Owner A",
        "phone": "555-0101",
        "location": "Coast road",
        "number_of_trees": 10,
        "annual_rent": 50000.0
    });
    let (status, _) = send(&app, json_req("POST", "/api/owners", Some(&worker_token), owner.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, json_req("POST", "/api/owners", Some(&admin_token), owner)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&body).unwrap();
    let owner_id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get(&format!("/api/owners/{owner_id}"), Some(&admin_token))).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched["id"], owner_id.as_str());
    assert_eq!(fetched["number_of_trees"], 10);

    let (status, _) = send(&app, get("/api/owners/not-an-id", Some(&admin_token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let tree = json!({
        "tree_id": "T1",
        "owner_id": owner_id,
        "location": "Coast road",
        "rent_per_year": 5000.0,
        "expected_coconuts_count": 150
    });
    let (status, _) = send(&app, json_req("POST", "/api/trees", Some(&admin_token), tree)).await;
    assert_eq!(status, StatusCode::CREATED);

    // Trees are readable by workers.
    let (status, body) = send(&app, get("/api/trees", Some(&worker_token))).await;
    assert_eq!(status, StatusCode::OK);
    let trees: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(trees.as_array().unwrap().len(), 1);
    assert_eq!(trees[0]["owner"]["name"], "Owner A");
    assert_eq!(trees[0]["status"], "active");

    let (status, body) = send(
        &app,
        get("/api/dashboard/admin?start=0&end=9999999999999", Some(&worker_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"null");

    let (status, body) = send(
        &app,
        get("/api/dashboard/admin?start=0&end=9999999999999", Some(&admin_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let stats: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["active_trees"], 1);
    assert_eq!(stats["total_owners"], 1);
    assert_eq!(stats["profit"], 0.0);

    let (status, body) = send(&app, get("/api/stock", Some(&worker_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"null");

    let (status, _) = send(&app, get("/api/users", Some(&worker_token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(&app, get("/api/users", Some(&admin_token))).await;
    assert_eq!(status, StatusCode::OK);
    let users: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(users.as_array().unwrap().len(), 2);

    common::teardown(ctx).await;
}
