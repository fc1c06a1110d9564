//! End-to-end tests for the gateway against a mocked backend.

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use lexpanel_admin::config::AppConfig;
use lexpanel_admin::state::AppState;
use lexpanel_client::ClientConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_HTML: &str = "<!doctype html><title>console</title>";

fn static_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), INDEX_HTML).expect("write index");
    dir
}

fn app_for(server: &MockServer, static_dir: &Path, enforce_admin_role: bool) -> Router {
    let mut config = AppConfig::new(ClientConfig::new(server.uri()));
    config.static_dir = static_dir.to_path_buf();
    config.enforce_admin_role = enforce_admin_role;
    lexpanel_admin::app(AppState::new(config).expect("state"))
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

async fn body_json_of(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get("set-cookie")
        .expect("set-cookie header")
        .to_str()
        .expect("cookie str")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn mock_login(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/admin-login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": format!("jwt-{role}"),
            "user": { "id": "u1", "name": "Staff", "email": "staff@example.com", "role": role }
        })))
        .mount(server)
        .await;
}

/// Log in through the gateway and return the session cookie.
async fn sign_in(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "staff@example.com", "password": "pw" })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

#[tokio::test]
async fn test_login_routes_ai_reporter_to_its_screen() {
    let server = MockServer::start().await;
    mock_login(&server, "ai_reporter").await;
    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);

    let response = app
        .oneshot(request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "staff@example.com", "password": "pw" })),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json_of(response).await;
    assert_eq!(body["redirect"], json!("/ai-reporter"));
    assert_eq!(body["user"]["role"], json!("ai_reporter"));
}

#[tokio::test]
async fn test_invalid_login_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/admin-login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);

    let response = app
        .oneshot(request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "not-an-email", "password": "pw" })),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json_of(response).await;
    assert_eq!(body["error"], json!("Enter a valid email address"));
}

#[tokio::test]
async fn test_enforced_role_refuses_client_accounts() {
    let server = MockServer::start().await;
    mock_login(&server, "client").await;
    let dir = static_dir();
    let app = app_for(&server, dir.path(), true);

    let response = app
        .oneshot(request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "staff@example.com", "password": "pw" })),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_pages_are_gated() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;
    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);

    let response = app
        .clone()
        .oneshot(request("GET", "/users", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/login");

    let response = app
        .clone()
        .oneshot(request("GET", "/login", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, INDEX_HTML.as_bytes());

    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/", Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/dashboard");

    let response = app
        .oneshot(request("GET", "/users", Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_without_session_is_401_json() {
    let server = MockServer::start().await;
    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);

    let response = app
        .oneshot(request("GET", "/api/users", None, None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json_of(response).await,
        json!({ "error": "not authenticated" })
    );
}

#[tokio::test]
async fn test_reject_through_gateway_posts_once_and_refetches_once() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;

    Mock::given(method("POST"))
        .and(path("/admin/users/l1/reject"))
        .and(header("authorization", "Bearer jwt-admin"))
        .and(body_json(json!({ "reason": "incomplete" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/lawyers/pending"))
        .and(header("authorization", "Bearer jwt-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "l2", "name": "Ben Brief", "email": "ben@example.com", "role": "lawyer" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);
    let cookie = sign_in(&app).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/lawyers/l1/reject",
            Some(&cookie),
            Some(json!({ "reason": "incomplete" })),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json_of(response).await;
    assert_eq!(
        body["notices"],
        json!([{ "level": "success", "message": "Lawyer rejected" }])
    );
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_blank_reject_reason_is_422() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;
    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);
    let cookie = sign_in(&app).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/lawyers/l1/reject",
            Some(&cookie),
            Some(json!({ "reason": "  " })),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_policy_never_reaches_backend() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;
    Mock::given(method("POST"))
        .and(path("/policies"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);
    let cookie = sign_in(&app).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/policies",
            Some(&cookie),
            Some(json!({ "title": "Refund Policy", "content": "", "status": "Active" })),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json_of(response).await,
        json!({ "error": "Content is required" })
    );
}

#[tokio::test]
async fn test_list_paging_is_clamped_before_forwarding() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(query_param("limit", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);
    let cookie = sign_in(&app).await;

    for uri in ["/api/users?limit=5000000", "/api/users?limit=0&page=0"] {
        let response = app
            .clone()
            .oneshot(request("GET", uri, Some(&cookie), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_backend_404_is_passed_through() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;
    Mock::given(method("GET"))
        .and(path("/policies/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Policy not found" })),
        )
        .mount(&server)
        .await;

    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);
    let cookie = sign_in(&app).await;

    let response = app
        .oneshot(request("GET", "/api/policies/missing", Some(&cookie), None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json_of(response).await,
        json!({ "error": "Policy not found" })
    );
}

#[tokio::test]
async fn test_export_is_served_as_attachment() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "u1", "name": "Ada", "email": "ada@example.com", "role": "client", "avatar": "blob" }
            ]
        })))
        .mount(&server)
        .await;

    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);
    let cookie = sign_in(&app).await;

    let response = app
        .oneshot(request(
            "GET",
            "/api/export/users?format=csv",
            Some(&cookie),
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()["content-disposition"]
        .to_str()
        .expect("header str")
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"users-"));
    assert!(disposition.ends_with(".csv\""));

    let body = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert_eq!(
        body,
        "id,name,email,role,isActive,isVerified,registeredOn\nu1,Ada,ada@example.com,client,false,false,\n"
    );
}

#[tokio::test]
async fn test_unknown_export_resource_is_404() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;
    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);
    let cookie = sign_in(&app).await;

    let response = app
        .oneshot(request("GET", "/api/export/invoices", Some(&cookie), None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let server = MockServer::start().await;
    mock_login(&server, "admin").await;
    let dir = static_dir();
    let app = app_for(&server, dir.path(), false);
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/auth/status", Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(body_json_of(response).await["authenticated"], json!(true));

    let response = app
        .clone()
        .oneshot(request("POST", "/auth/logout", Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/auth/status", Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(
        body_json_of(response).await,
        json!({ "authenticated": false })
    );
}
