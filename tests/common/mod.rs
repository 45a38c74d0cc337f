//! Fake backend for integration tests
//!
//! Tokens: `acc-1`/`ref-1` are issued at login, `acc-2`/`ref-2` by a
//! successful refresh. `expired` is a well-formed but rejected token.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use parking_lot::Mutex;
use securechain::web::{build_router, AppState};
use securechain::Config;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

pub const VALID_TOKENS: &[&str] = &["acc-1", "acc-2"];

#[derive(Default)]
pub struct Backend {
    pub forwarded: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub logouts: AtomicUsize,
    pub last_authorization: Mutex<Option<String>>,
}

impl Backend {
    pub fn forwarded(&self) -> usize {
        self.forwarded.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

fn with_cookies(mut response: Response, cookies: &[&'static str]) -> Response {
    for cookie in cookies {
        response
            .headers_mut()
            .append(header::SET_COOKIE, HeaderValue::from_static(cookie));
    }
    response
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != json!("secret") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": "invalid_credentials", "message": "Wrong password"})),
        )
            .into_response();
    }
    with_cookies(
        Json(json!({"code": "login_success", "user_id": "u1"})).into_response(),
        &[
            "access_token=acc-1; Path=/; HttpOnly; Max-Age=60",
            "refresh_token=ref-1; Path=/; HttpOnly; Max-Age=60",
        ],
    )
}

async fn check_token(Json(body): Json<Value>) -> Response {
    let token = body["token"].as_str().unwrap_or_default();
    if VALID_TOKENS.contains(&token) {
        Json(json!({"code": "token_verification_success", "valid": true})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": "token_expired", "valid": false})),
        )
            .into_response()
    }
}

async fn refresh(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.refreshes.fetch_add(1, Ordering::SeqCst);
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !cookie.contains("refresh_token=ref-1") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": "invalid_refresh_token"})),
        )
            .into_response();
    }
    with_cookies(
        Json(json!({"code": "refresh_token_success"})).into_response(),
        &[
            "access_token=acc-2; Path=/; HttpOnly",
            "refresh_token=ref-2; Path=/; HttpOnly",
        ],
    )
}

async fn logout(State(backend): State<Arc<Backend>>) -> Json<Value> {
    backend.logouts.fetch_add(1, Ordering::SeqCst);
    Json(json!({"code": "logout_success"}))
}

async fn expand_package(Json(body): Json<Value>) -> Json<Value> {
    let purl = body["package_purl"].as_str().unwrap_or_default().to_string();
    Json(json!({
        "code": "get_package_ssc_success",
        "data": {
            "nodes": [
                {"id": format!("{}@1.0.0", purl), "label": "1.0.0", "type": "Version",
                 "props": {"serial_number": 1}},
                {"id": format!("{}@2.0.0", purl), "label": "2.0.0", "type": "Version",
                 "props": {"serial_number": 2, "vulnerabilities": ["CVE-2024-0001"]}}
            ],
            "edges": [
                {"source": purl, "target": format!("{}@1.0.0", purl), "type": "HAVE"},
                {"source": purl, "target": format!("{}@2.0.0", purl), "type": "HAVE"}
            ]
        }
    }))
}

pub const ZIP_BYTES: &[u8] = &[0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe, 0x00, 0x80];

async fn download(State(backend): State<Arc<Backend>>) -> Response {
    backend.forwarded.fetch_add(1, Ordering::SeqCst);
    (
        [
            (header::CONTENT_TYPE, "application/zip"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"vex.zip\""),
        ],
        ZIP_BYTES,
    )
        .into_response()
}

/// Echo for Depex/VEXGen forwarding
async fn echo(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    backend.forwarded.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *backend.last_authorization.lock() = authorization.clone();

    if uri.path().ends_with("/missing") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"code": "package_not_found", "message": "Package not found"})),
        )
            .into_response();
    }

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "authorization": authorization,
        "body": body,
    }))
    .into_response()
}

/// Start the fake backend on an ephemeral port
pub async fn spawn_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/check_token", post(check_token))
        .route("/auth/refresh_token", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/depex/graph/package/expand", post(expand_package))
        .route("/vexgen/vex/download", post(download))
        .route("/vexgen/tix/download", post(download))
        .route("/depex/*rest", any(echo))
        .route("/vexgen/*rest", any(echo))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

/// Router under test, pointed at `backend_url`
pub fn app(backend_url: &str) -> Router {
    let mut config = Config::default();
    config.backend.url = backend_url.to_string();
    config.backend.timeout_secs = 5;
    build_router(AppState::new(config).unwrap())
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

/// Like `send`, without assuming a JSON body
pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    (status, headers, bytes)
}

/// Request with a verbatim body under the given content type
pub fn raw_request(method: &str, uri: &str, content_type: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub fn find_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a String> {
    cookies
        .iter()
        .find(|c| c.starts_with(&format!("{}=", name)))
}
