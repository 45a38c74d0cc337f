//! `with_auth` route guard

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::backend::AuthBackend;
use super::cookies::{append_set_cookies, CookiePolicy};
use super::token::get_valid_token;

/// Everything the guard needs, kept separate from the router state
#[derive(Debug, Clone)]
pub struct AuthState {
    pub backend: AuthBackend,
    pub cookies: CookiePolicy,
}

/// Resolve a valid token before the handler runs
///
/// The handler receives the token as a [`super::ValidToken`] request
/// extension. When the token had to be refreshed, the rotated cookies are
/// appended to whatever response the handler produced. On failure the
/// handler is not called.
pub async fn with_auth(State(auth): State<AuthState>, mut request: Request, next: Next) -> Response {
    let token = match get_valid_token(&auth.backend, request.headers()).await {
        Ok(token) => token,
        Err(e) => {
            debug!(code = e.code(), path = %request.uri().path(), "auth rejected");
            return e.into_response();
        }
    };

    let cookies = token.cookies(&auth.cookies);
    request.extensions_mut().insert(token);

    let mut response = next.run(request).await;
    append_set_cookies(response.headers_mut(), &cookies);
    response
}
