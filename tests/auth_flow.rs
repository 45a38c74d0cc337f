mod common;

use common::{app, find_cookie, json_request, raw_request, send, set_cookies, spawn_backend};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_login_sets_cookies_then_cookie_only_check_is_valid() {
    let (url, _backend) = spawn_backend().await;
    let app = app(&url);

    let (status, headers, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &[],
            Some(json!({"email": "ada@example.com", "password": "secret"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "login_success");

    let cookies = set_cookies(&headers);
    let access = find_cookie(&cookies, "access_token").expect("access cookie");
    let refresh = find_cookie(&cookies, "refresh_token").expect("refresh cookie");
    assert!(access.starts_with("access_token=acc-1"));
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("Path=/"));
    assert!(access.contains("SameSite=Lax"));
    assert!(access.contains("Max-Age=900"));
    assert!(refresh.starts_with("refresh_token=ref-1"));
    assert!(refresh.contains("Max-Age=604800"));

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/check_token",
            &[("cookie", "access_token=acc-1")],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"valid": true}));
}

#[tokio::test]
async fn test_failed_login_sets_no_cookies() {
    let (url, _backend) = spawn_backend().await;
    let app = app(&url);

    let (status, headers, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &[],
            Some(json!({"email": "ada@example.com", "password": "nope"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");
    assert!(set_cookies(&headers).is_empty());
}

#[tokio::test]
async fn test_check_token_without_any_token() {
    let (url, _backend) = spawn_backend().await;
    let (status, _, body) = send(
        &app(&url),
        json_request("POST", "/api/auth/check_token", &[], None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "missing_token");
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let (url, backend) = spawn_backend().await;
    let app = app(&url);

    let (status, headers, body) = send(
        &app,
        json_request(
            "GET",
            "/api/depex/package/status?package_name=flask",
            &[("cookie", "access_token=expired; refresh_token=ref-1")],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.forwarded(), 1);
    assert_eq!(backend.refreshes(), 1);
    assert_eq!(body["authorization"], "Bearer acc-2");
    assert_eq!(body["query"], "package_name=flask");

    let cookies = set_cookies(&headers);
    assert!(find_cookie(&cookies, "access_token")
        .unwrap()
        .starts_with("access_token=acc-2"));
    assert!(find_cookie(&cookies, "refresh_token")
        .unwrap()
        .starts_with("refresh_token=ref-2"));
}

#[tokio::test]
async fn test_refresh_failure_never_reaches_handler() {
    let (url, backend) = spawn_backend().await;
    let app = app(&url);

    let (status, headers, body) = send(
        &app,
        json_request(
            "POST",
            "/api/depex/operation/smt/valid_graph",
            &[("cookie", "access_token=expired; refresh_token=revoked")],
            Some(json!({"requirement_file_id": "rf-1", "max_level": -1})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "token_expired");
    assert_eq!(backend.forwarded(), 0);
    assert_eq!(backend.refreshes(), 1);
    assert!(set_cookies(&headers).is_empty());
}

#[tokio::test]
async fn test_missing_refresh_cookie_is_token_expired() {
    let (url, backend) = spawn_backend().await;
    let (status, _, body) = send(
        &app(&url),
        json_request(
            "GET",
            "/api/vexgen/vex/user/u1",
            &[("authorization", "Bearer expired")],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "token_expired");
    assert_eq!(backend.refreshes(), 0);
    assert_eq!(backend.forwarded(), 0);
}

#[tokio::test]
async fn test_refresh_route_rotates_cookies() {
    let (url, _backend) = spawn_backend().await;
    let app = app(&url);

    let (status, headers, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/refresh_token",
            &[("cookie", "refresh_token=ref-1")],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookies = set_cookies(&headers);
    assert!(find_cookie(&cookies, "access_token")
        .unwrap()
        .starts_with("access_token=acc-2"));

    let (status, _, body) = send(
        &app,
        json_request("POST", "/api/auth/refresh_token", &[], None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "missing_refresh_token");
}

#[tokio::test]
async fn test_logout_clears_cookies_even_when_backend_is_down() {
    let app = app("http://127.0.0.1:9");
    let (status, headers, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/logout",
            &[("cookie", "access_token=acc-1; refresh_token=ref-1")],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let cookies = set_cookies(&headers);
    assert!(find_cookie(&cookies, "access_token")
        .unwrap()
        .contains("Max-Age=0"));
    assert!(find_cookie(&cookies, "refresh_token")
        .unwrap()
        .contains("Max-Age=0"));
}

#[tokio::test]
async fn test_malformed_login_body_is_json_error() {
    let (url, _backend) = spawn_backend().await;
    let (status, headers, body) = send(
        &app(&url),
        raw_request("POST", "/api/auth/login", "application/json", "{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(body["code"], "invalid_parameter");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}
