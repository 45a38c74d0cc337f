//! Auth routes
//!
//! Login and refresh re-issue the backend's tokens as our own httpOnly
//! cookies; logout always clears them.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Json,
};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::{
    append_set_cookies, cookie_value, token_from_headers, IssuedTokens, ValidToken,
    ACCOUNT_EXISTS_PATH, CHANGE_PASSWORD_PATH, LOGIN_PATH, LOGOUT_PATH, REFRESH_TOKEN_COOKIE,
    SIGNUP_PATH,
};
use crate::core::error::{Error, Result};
use crate::web::extract::JsonBody;
use crate::web::server::{pass_through, AppState};

/// Optional JSON body; an empty or non-JSON body reads as `Null`
fn json_body(body: &Bytes) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn string_field(body: &Value, name: &str) -> Option<String> {
    body.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub async fn api_login(State(state): State<AppState>, JsonBody(body): JsonBody<Value>) -> Result<Response> {
    let reply = state
        .auth
        .backend
        .forward(Method::POST, LOGIN_PATH, Some(&body), None)
        .await?;

    let mut response = pass_through(&reply);
    if !reply.is_success() {
        debug!(status = reply.status, "Login rejected by backend");
        return Ok(response);
    }

    let tokens = IssuedTokens::from_backend(&reply.set_cookies, &reply.body);
    if tokens.is_empty() {
        warn!("Login succeeded without issuing tokens");
    } else {
        info!("User logged in");
    }
    append_set_cookies(response.headers_mut(), &state.auth.cookies.issue(&tokens));
    Ok(response)
}

pub async fn api_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let bearer = token_from_headers(&headers);
    let result = state
        .auth
        .backend
        .forward(Method::POST, LOGOUT_PATH, None, bearer.as_deref())
        .await;

    let mut response = match result {
        Ok(reply) if reply.is_success() => pass_through(&reply),
        Ok(reply) => {
            debug!(status = reply.status, "Backend logout failed, clearing cookies anyway");
            Json(json!({ "code": "logout_success", "message": "Logged out" })).into_response()
        }
        Err(e) => {
            warn!("Backend logout unreachable, clearing cookies anyway: {}", e);
            Json(json!({ "code": "logout_success", "message": "Logged out" })).into_response()
        }
    };

    append_set_cookies(response.headers_mut(), &state.auth.cookies.clear_all());
    response
}

pub async fn api_signup(State(state): State<AppState>, JsonBody(body): JsonBody<Value>) -> Result<Response> {
    let reply = state
        .auth
        .backend
        .forward(Method::POST, SIGNUP_PATH, Some(&body), None)
        .await?;
    Ok(pass_through(&reply))
}

pub async fn api_account_exists(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response> {
    let reply = state
        .auth
        .backend
        .forward(Method::POST, ACCOUNT_EXISTS_PATH, Some(&body), None)
        .await?;
    Ok(pass_through(&reply))
}

/// Check a token from the body, the Authorization header or the cookie
pub async fn api_check_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let token = string_field(&json_body(&body), "token")
        .or_else(|| token_from_headers(&headers))
        .ok_or(Error::MissingToken)?;

    let valid = state.auth.backend.check_token(&token).await;
    Ok(Json(json!({ "valid": valid })))
}

/// Exchange the refresh cookie for fresh tokens
pub async fn api_refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let refresh_token = cookie_value(&headers, REFRESH_TOKEN_COOKIE)
        .or_else(|| string_field(&json_body(&body), "refresh_token"))
        .ok_or(Error::MissingRefreshToken)?;

    let mut tokens = state.auth.backend.refresh(&refresh_token).await?;
    if tokens.refresh_token.is_none() {
        tokens.refresh_token = Some(refresh_token);
    }

    let mut response = Json(json!({ "code": "token_refreshed", "refreshed": true })).into_response();
    append_set_cookies(response.headers_mut(), &state.auth.cookies.issue(&tokens));
    Ok(response)
}

pub async fn api_change_password(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response> {
    let reply = state
        .auth
        .backend
        .forward(
            Method::POST,
            CHANGE_PASSWORD_PATH,
            Some(&body),
            Some(&token.access_token),
        )
        .await?;
    Ok(pass_through(&reply))
}
