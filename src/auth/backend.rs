//! Calls to the Auth service

use reqwest::{header, Method};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::cookies::{IssuedTokens, REFRESH_TOKEN_COOKIE};
use crate::client::{ApiClient, BackendResponse};
use crate::core::error::{Error, Result};

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const CHECK_TOKEN_PATH: &str = "/auth/check_token";
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh_token";
pub const ACCOUNT_EXISTS_PATH: &str = "/auth/account_exists";
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change_password";

/// Auth service client
#[derive(Debug, Clone)]
pub struct AuthBackend {
    client: ApiClient,
}

impl AuthBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Ask the backend whether `token` is still valid
    ///
    /// Any failure, including network errors, counts as invalid.
    pub async fn check_token(&self, token: &str) -> bool {
        let response = match self
            .client
            .send_json(
                Method::POST,
                CHECK_TOKEN_PATH,
                &json!({ "token": token }),
                Some(token),
            )
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Token check failed, treating token as invalid: {}", e);
                return false;
            }
        };

        if !response.is_success() {
            debug!(status = response.status, "Token rejected");
            return false;
        }
        is_valid_reply(&response.body)
    }

    /// Exchange a refresh token for new tokens
    ///
    /// Fails with `token_expired` on any rejection or transport error.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens> {
        let request = self
            .client
            .request(Method::POST, REFRESH_TOKEN_PATH, None)
            .header(
                header::COOKIE,
                format!("{}={}", REFRESH_TOKEN_COOKIE, refresh_token),
            )
            .json(&json!({ "refresh_token": refresh_token }));

        let response = match self.client.execute(request).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Token refresh request failed: {}", e);
                return Err(Error::TokenExpired);
            }
        };

        if !response.is_success() {
            debug!(status = response.status, "Refresh token rejected");
            return Err(Error::TokenExpired);
        }

        let tokens = IssuedTokens::from_backend(&response.set_cookies, &response.body);
        if tokens.access_token.is_none() {
            warn!("Refresh succeeded without issuing an access token");
            return Err(Error::TokenExpired);
        }
        Ok(tokens)
    }

    /// Forward a JSON request to an auth endpoint, returning the raw reply
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<BackendResponse> {
        let mut request = self.client.request(method, path, bearer);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.client.execute(request).await
    }
}

/// `{ "valid": true }`, possibly inside a `data` envelope
fn is_valid_reply(body: &Value) -> bool {
    body.get("valid")
        .or_else(|| body.get("data").and_then(|d| d.get("valid")))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
