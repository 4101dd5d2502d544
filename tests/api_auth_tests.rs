//! 登录 / 登出集成测试

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_json as match_body, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{body_json, create_test_app, set_cookie, set_cookies};

async fn mount_login(server: &MockServer, password: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(match_body(json!({"email": "admin@x.com", "password": password})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_success_sets_both_cookies() {
    let server = MockServer::start().await;
    mount_login(&server, "secret").await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login?from=%2Fadmin%2Freuniones")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "admin@x.com", "password": "secret"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let access = set_cookie(&response, "admin_access_token").expect("access cookie");
    assert!(access.starts_with("admin_access_token=a1"));
    assert!(access.contains("Max-Age=86400"));
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("Path=/"));

    let refresh = set_cookie(&response, "admin_refresh_token").expect("refresh cookie");
    assert!(refresh.starts_with("admin_refresh_token=r1"));
    assert!(refresh.contains("Max-Age=604800"));

    let json = body_json(response).await;
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["redirect"], "/admin/reuniones");
}

#[tokio::test]
async fn test_login_accepts_form_credentials() {
    let server = MockServer::start().await;
    mount_login(&server, "secret").await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=admin%40x.com&password=secret"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookies(&response).len(), 2);

    let json = body_json(response).await;
    assert_eq!(json["redirect"], "/admin/dashboard");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "admin@x.com", "password": "wrong"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], 401);
    assert_eq!(json["error"]["message"], "Invalid credentials");
    assert!(json["error"].get("redirect").is_none());
}

#[tokio::test]
async fn test_login_with_malformed_body() {
    let server = MockServer::start().await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email": "admin@x.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_page_echoes_return_path() {
    let server = MockServer::start().await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/login?from=%2Fadmin%2Fvehiculos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["from"], "/admin/vehiculos");
    assert_eq!(json["action"], "/admin/login");
}

#[tokio::test]
async fn test_logout_clears_cookies_and_redirects() {
    let server = MockServer::start().await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/logout")
                .header(header::COOKIE, "admin_access_token=a1; admin_refresh_token=r1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/login");

    let access = set_cookie(&response, "admin_access_token").expect("access removal");
    assert!(access.contains("Max-Age=0"));
    let refresh = set_cookie(&response, "admin_refresh_token").expect("refresh removal");
    assert!(refresh.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_with_only_refresh_cookie_clears_it() {
    let server = MockServer::start().await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/logout")
                .header(header::COOKIE, "admin_refresh_token=r1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/login");

    let refresh = set_cookie(&response, "admin_refresh_token").expect("refresh removal");
    assert!(refresh.contains("Max-Age=0"));
    if let Some(access) = set_cookie(&response, "admin_access_token") {
        assert!(access.contains("Max-Age=0"));
    }
}

#[tokio::test]
async fn test_logout_without_cookies_is_a_no_op() {
    let server = MockServer::start().await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/login");
    for cookie in set_cookies(&response) {
        assert!(cookie.contains("Max-Age=0"));
    }
}
