//! Resolving a usable bearer token for an incoming request

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::Cookie;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::backend::AuthBackend;
use super::cookies::{cookie_value, CookiePolicy, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::core::error::{Error, Result};

fn jwt_subject(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let claims: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;
    ["sub", "user_id"].iter().find_map(|claim| match &claims[*claim] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// A token the backend accepted for this request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidToken {
    pub access_token: String,
    /// Refresh token to re-issue, when a refresh happened
    pub refresh_token: Option<String>,
    pub refreshed: bool,
}

impl ValidToken {
    /// Stable key for the account this token belongs to
    ///
    /// The JWT subject (`sub` or `user_id` claim) when the token carries
    /// one, so refreshed tokens keep the same owner; otherwise a SHA-256 of
    /// the token itself. The signature is not checked here; the backend
    /// already accepted the token.
    pub fn owner(&self) -> String {
        match jwt_subject(&self.access_token) {
            Some(subject) => format!("sub:{}", subject),
            None => {
                let mut hasher = Sha256::new();
                hasher.update(self.access_token.as_bytes());
                format!("tok:{:x}", hasher.finalize())
            }
        }
    }

    /// Cookies the browser must receive after a refresh
    pub fn cookies(&self, policy: &CookiePolicy) -> Vec<Cookie<'static>> {
        if !self.refreshed {
            return Vec::new();
        }
        let mut cookies = vec![policy.access_cookie(&self.access_token)];
        if let Some(refresh) = &self.refresh_token {
            cookies.push(policy.refresh_cookie(refresh));
        }
        cookies
    }
}

/// `Authorization: Bearer <token>`
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Bearer header first, then the access token cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    bearer_from_headers(headers).or_else(|| cookie_value(headers, ACCESS_TOKEN_COOKIE))
}

/// Produce a valid access token for the request, refreshing at most once
pub async fn get_valid_token(backend: &AuthBackend, headers: &HeaderMap) -> Result<ValidToken> {
    let token = token_from_headers(headers).ok_or_else(|| Error::Unauthorized {
        message: "No access token in Authorization header or cookie".to_string(),
    })?;

    if backend.check_token(&token).await {
        return Ok(ValidToken {
            access_token: token,
            refresh_token: None,
            refreshed: false,
        });
    }

    debug!("Access token invalid, attempting refresh");
    let refresh_token = cookie_value(headers, REFRESH_TOKEN_COOKIE).ok_or(Error::TokenExpired)?;
    let issued = backend.refresh(&refresh_token).await?;
    let access_token = issued.access_token.ok_or(Error::TokenExpired)?;

    info!("Access token refreshed");
    Ok(ValidToken {
        access_token,
        refresh_token: Some(issued.refresh_token.unwrap_or(refresh_token)),
        refreshed: true,
    })
}
