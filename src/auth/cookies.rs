//! Session cookies
//!
//! Tokens live in httpOnly cookies owned by this layer. Backend replies
//! announce new tokens through `Set-Cookie` (or, for some endpoints, the
//! JSON body); they are re-issued here with our own attributes.

use axum::http::{header, HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::Value;
use tracing::warn;

use crate::core::config::Config;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Attributes applied to every session cookie
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    secure: bool,
    same_site: SameSite,
    access_max_age_secs: i64,
    refresh_max_age_secs: i64,
}

impl CookiePolicy {
    /// Production: `Secure; SameSite=None`. Development: `SameSite=Lax`.
    pub fn from_config(config: &Config) -> Self {
        let production = config.environment.is_production();
        Self {
            secure: production,
            same_site: if production {
                SameSite::None
            } else {
                SameSite::Lax
            },
            access_max_age_secs: config.cookies.access_max_age_secs,
            refresh_max_age_secs: config.cookies.refresh_max_age_secs,
        }
    }

    pub fn access_cookie(&self, token: &str) -> Cookie<'static> {
        self.build(ACCESS_TOKEN_COOKIE, token.to_string(), self.access_max_age_secs)
    }

    pub fn refresh_cookie(&self, token: &str) -> Cookie<'static> {
        self.build(REFRESH_TOKEN_COOKIE, token.to_string(), self.refresh_max_age_secs)
    }

    /// Expired cookie that makes the browser drop `name`
    pub fn removal(&self, name: &'static str) -> Cookie<'static> {
        self.build(name, String::new(), 0)
    }

    /// Cookies for whichever tokens were issued
    pub fn issue(&self, tokens: &IssuedTokens) -> Vec<Cookie<'static>> {
        let mut cookies = Vec::with_capacity(2);
        if let Some(access) = &tokens.access_token {
            cookies.push(self.access_cookie(access));
        }
        if let Some(refresh) = &tokens.refresh_token {
            cookies.push(self.refresh_cookie(refresh));
        }
        cookies
    }

    pub fn clear_all(&self) -> Vec<Cookie<'static>> {
        vec![
            self.removal(ACCESS_TOKEN_COOKIE),
            self.removal(REFRESH_TOKEN_COOKIE),
        ]
    }

    fn build(&self, name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(time::Duration::seconds(max_age_secs))
            .build()
    }
}

/// Tokens handed out by the auth backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl IssuedTokens {
    /// Read tokens from `Set-Cookie` values, falling back to JSON body fields
    pub fn from_backend(set_cookies: &[String], body: &Value) -> Self {
        let mut tokens = IssuedTokens::default();

        for raw in set_cookies {
            match Cookie::parse(raw.as_str()) {
                Ok(cookie) if !cookie.value().is_empty() => match cookie.name() {
                    ACCESS_TOKEN_COOKIE => tokens.access_token = Some(cookie.value().to_string()),
                    REFRESH_TOKEN_COOKIE => {
                        tokens.refresh_token = Some(cookie.value().to_string())
                    }
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => warn!("Ignoring malformed Set-Cookie from backend: {}", e),
            }
        }

        let field = |name: &str| {
            body.get(name)
                .or_else(|| body.get("data").and_then(|d| d.get(name)))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        if tokens.access_token.is_none() {
            tokens.access_token = field(ACCESS_TOKEN_COOKIE);
        }
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = field(REFRESH_TOKEN_COOKIE);
        }

        tokens
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Read a cookie value from request headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Append `Set-Cookie` headers to a response
pub fn append_set_cookies(headers: &mut HeaderMap, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Skipping unencodable cookie {}: {}", cookie.name(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Environment;
    use serde_json::json;

    fn policy(env: Environment) -> CookiePolicy {
        let mut config = Config::default();
        config.environment = env;
        CookiePolicy::from_config(&config)
    }

    #[test]
    fn test_development_attributes() {
        let cookie = policy(Environment::Development).access_cookie("abc").to_string();
        assert!(cookie.starts_with("access_token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=900"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_production_attributes() {
        let cookie = policy(Environment::Production)
            .refresh_cookie("r")
            .to_string();
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn test_removal_expires() {
        let cookie = policy(Environment::Development)
            .removal(ACCESS_TOKEN_COOKIE)
            .to_string();
        assert!(cookie.starts_with("access_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_tokens_from_set_cookie() {
        let tokens = IssuedTokens::from_backend(
            &[
                "access_token=aaa; HttpOnly; Path=/".to_string(),
                "refresh_token=rrr; HttpOnly; Path=/".to_string(),
                "other=x".to_string(),
            ],
            &Value::Null,
        );
        assert_eq!(tokens.access_token.as_deref(), Some("aaa"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("rrr"));
    }

    #[test]
    fn test_tokens_from_body_fallback() {
        let tokens = IssuedTokens::from_backend(
            &[],
            &json!({"code": "login_success", "data": {"access_token": "aaa"}}),
        );
        assert_eq!(tokens.access_token.as_deref(), Some("aaa"));
        assert!(tokens.refresh_token.is_none());
    }

    #[test]
    fn test_cookie_value_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; refresh_token=xyz"),
        );
        assert_eq!(cookie_value(&headers, REFRESH_TOKEN_COOKIE).as_deref(), Some("xyz"));
        assert!(cookie_value(&headers, ACCESS_TOKEN_COOKIE).is_none());
    }
}
