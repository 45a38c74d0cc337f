//! Session handling for the API layer
//!
//! Validates bearer tokens against the Auth service, refreshes them from
//! the refresh cookie when they expire, and keeps the browser's cookies
//! in step with whatever the backend issued.

mod backend;
mod cookies;
mod middleware;
mod token;

pub use backend::{
    AuthBackend, ACCOUNT_EXISTS_PATH, CHANGE_PASSWORD_PATH, CHECK_TOKEN_PATH, LOGIN_PATH,
    LOGOUT_PATH, REFRESH_TOKEN_PATH, SIGNUP_PATH,
};
pub use cookies::{
    append_set_cookies, cookie_value, CookiePolicy, IssuedTokens, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
pub use middleware::{with_auth, AuthState};
pub use token::{bearer_from_headers, get_valid_token, token_from_headers, ValidToken};
