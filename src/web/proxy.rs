//! Authenticated pass-through to Depex and VEXGen
//!
//! `/api/depex/...` maps to `${BACKEND_URL}/depex/...` (same for vexgen)
//! with the caller's valid token attached. Method, query string and body
//! travel unchanged; the backend's status and body come back unchanged.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, Uri},
    response::Response,
    Extension,
};
use tracing::debug;

use crate::auth::ValidToken;
use crate::core::error::{Error, Result};
use crate::web::server::{pass_through, AppState};

const API_PREFIX: &str = "/api";

/// Backend path (and query) for an incoming `/api/...` URI
pub fn backend_path(uri: &Uri) -> Result<String> {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .filter(|rest| rest.starts_with("/depex/") || rest.starts_with("/vexgen/"))
        .ok_or_else(|| Error::invalid("path", format!("cannot forward {}", uri.path())))?;

    if path.split('/').any(|segment| segment == "..") {
        return Err(Error::invalid("path", "must not contain '..'"));
    }

    Ok(match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    })
}

pub async fn api_forward(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let path = backend_path(&uri)?;
    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|_| Error::invalid("method", method.as_str().to_string()))?;
    debug!(%method, path = %path, "Forwarding to backend");

    let mut request = state
        .client
        .request(method, &path, Some(&token.access_token));
    if !body.is_empty() {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json");
        request = request
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body.to_vec());
    }

    let reply = state.client.execute(request).await?;
    Ok(pass_through(&reply))
}
