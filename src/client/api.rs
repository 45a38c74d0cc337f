use reqwest::{header, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::error::{Error, Result};

/// Raw backend reply, kept transport-agnostic so routes can pass it through
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    /// Raw `Set-Cookie` header values, in order
    pub set_cookies: Vec<String>,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    /// Body bytes exactly as received
    pub raw: Vec<u8>,
    /// Parsed JSON body; `Null` when empty or binary, `String` when text
    pub body: Value,
}

impl BackendResponse {
    /// Build a reply from its parts, deriving `body` from `raw`
    pub fn new(status: u16, content_type: Option<String>, raw: Vec<u8>) -> Self {
        let body = parse_body(&raw);
        Self {
            status,
            set_cookies: Vec::new(),
            content_type,
            content_disposition: None,
            raw,
            body,
        }
    }

    /// Whether the reply carries a JSON document
    pub fn is_json(&self) -> bool {
        match self.content_type.as_deref() {
            Some(ct) => ct.contains("json"),
            None => !self.body.is_null(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Keep a 2xx reply; anything else becomes a backend error carrying its code
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let code = self
            .body
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_code(self.status).to_string());

        let message = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| self.body.get("detail").and_then(Value::as_str))
            .or_else(|| self.body.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Backend responded with status {}", self.status));

        Err(Error::Backend {
            status: self.status,
            code,
            message,
        })
    }

    /// The JSON body of a 2xx reply
    pub fn into_result(self) -> Result<Value> {
        self.error_for_status().map(|reply| reply.body)
    }

    /// Unwrap the conventional `{ "data": ... }` envelope if present
    pub fn data(&self) -> &Value {
        self.body.get("data").unwrap_or(&self.body)
    }
}

fn parse_body(raw: &[u8]) -> Value {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    if let Ok(value) = serde_json::from_slice(raw) {
        return value;
    }
    match std::str::from_utf8(raw) {
        Ok(text) => Value::String(text.to_string()),
        Err(_) => Value::Null,
    }
}

fn header_string(headers: &header::HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn fallback_code(status: u16) -> &'static str {
    match status {
        400 | 422 => "invalid_parameter",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not_found",
        _ => "backend_error",
    }
}

/// JSON client bound to one base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("securechain-web/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Start a request against `path`, optionally authenticated
    pub fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a prepared request; network failures become `network_error`
    pub async fn execute(&self, builder: RequestBuilder) -> Result<BackendResponse> {
        let response = builder.send().await.map_err(|e| {
            warn!("Backend request failed: {}", e);
            Error::Network {
                message: format!("Backend request failed: {}", e),
            }
        })?;

        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        let content_type = header_string(response.headers(), header::CONTENT_TYPE);
        let content_disposition = header_string(response.headers(), header::CONTENT_DISPOSITION);

        let raw = response
            .bytes()
            .await
            .map_err(|e| Error::Network {
                message: format!("Failed to read backend response: {}", e),
            })?
            .to_vec();

        debug!(status, bytes = raw.len(), "Backend responded");

        let mut reply = BackendResponse::new(status, content_type, raw);
        reply.set_cookies = set_cookies;
        reply.content_disposition = content_disposition;
        Ok(reply)
    }

    /// Send a JSON body and return the raw reply
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<BackendResponse> {
        self.execute(self.request(method, path, bearer).json(body))
            .await
    }

    /// GET and decode the (unwrapped) JSON reply
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, bearer: Option<&str>) -> Result<T> {
        let response = self.execute(self.request(Method::GET, path, bearer)).await?;
        decode(response)
    }

    /// POST a JSON body and decode the (unwrapped) JSON reply
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T> {
        let response = self.send_json(Method::POST, path, body, bearer).await?;
        decode(response)
    }
}

fn decode<T: DeserializeOwned>(response: BackendResponse) -> Result<T> {
    let body = response.into_result()?;
    let payload = match body {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    };
    Ok(serde_json::from_value(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(status: u16, body: Value) -> BackendResponse {
        BackendResponse::new(
            status,
            Some("application/json".to_string()),
            serde_json::to_vec(&body).unwrap(),
        )
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://backend:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/auth/login"), "http://backend:8000/auth/login");
        assert_eq!(client.url("depex/x"), "http://backend:8000/depex/x");
        assert_eq!(client.url(""), "http://backend:8000");
    }

    #[test]
    fn test_error_code_from_body() {
        let err = reply(404, json!({"code": "package_not_found", "message": "nope"}))
            .into_result()
            .unwrap_err();
        assert_eq!(err.code(), "package_not_found");
        assert_eq!(err.message(), "nope");
    }

    #[test]
    fn test_fastapi_detail_message() {
        let err = reply(401, json!({"detail": "Not authenticated"}))
            .into_result()
            .unwrap_err();
        assert_eq!(err.code(), "unauthorized");
        assert_eq!(err.message(), "Not authenticated");
    }

    #[test]
    fn test_data_envelope() {
        let r = reply(200, json!({"code": "ok", "data": {"valid": true}}));
        assert_eq!(r.data()["valid"], json!(true));
        let bare = reply(200, json!({"valid": true}));
        assert_eq!(bare.data()["valid"], json!(true));
    }

    #[test]
    fn test_binary_body_kept_raw() {
        let bytes = vec![0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe, 0x00, 0x80];
        let r = BackendResponse::new(200, Some("application/zip".to_string()), bytes.clone());
        assert_eq!(r.raw, bytes);
        assert!(r.body.is_null());
        assert!(!r.is_json());

        let text = BackendResponse::new(502, Some("text/plain".to_string()), b"bad gateway".to_vec());
        assert_eq!(text.body, json!("bad gateway"));
        assert_eq!(text.into_result().unwrap_err().message(), "bad gateway");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client
            .execute(client.request(Method::GET, "/health", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "network_error");
    }
}
