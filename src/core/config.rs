//! Configuration management
//!
//! Configuration is built once at startup and handed to the router by
//! `Arc`. Sources are merged in order: defaults, the TOML config file,
//! then environment variables.

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default request timeout towards backend services
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Access token cookie lifetime (15 minutes)
pub const ACCESS_TOKEN_MAX_AGE_SECS: i64 = 15 * 60;

/// Refresh token cookie lifetime (7 days)
pub const REFRESH_TOKEN_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Web3Forms submission endpoint used by the contact form
pub const DEFAULT_CONTACT_ENDPOINT: &str = "https://api.web3forms.com/submit";

/// Deployment environment, derived from `NODE_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub cookies: CookieConfig,
    pub public: PublicConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to serve on
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend gateway (Auth, Depex, VEXGen)
    pub url: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Access token cookie max-age (seconds)
    pub access_max_age_secs: i64,
    /// Refresh token cookie max-age (seconds)
    pub refresh_max_age_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PublicConfig {
    /// Public URL of this API layer
    pub api_url: Option<String>,
    /// Public URL of the web application
    pub app_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Web3Forms access key
    pub access_key: Option<String>,
    pub endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_max_age_secs: ACCESS_TOKEN_MAX_AGE_SECS,
            refresh_max_age_secs: REFRESH_TOKEN_MAX_AGE_SECS,
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            endpoint: DEFAULT_CONTACT_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default file location and the process environment
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let path = Self::config_path()?;
        Self::load_from(Some(&path), &vars)
    }

    /// Load configuration from an optional file plus an explicit variable map
    pub fn load_from(path: Option<&Path>, vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content)?
            }
            _ => Config::default(),
        };

        config.apply_env(vars);
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables on top of file/default values
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get("BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(env) = get("NODE_ENV") {
            self.environment = Environment::parse(&env);
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(secs) = get("SECURECHAIN_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.backend.timeout_secs = secs;
        }
        if let Some(url) = get("NEXT_PUBLIC_API_URL") {
            self.public.api_url = Some(url);
        }
        if let Some(url) = get("NEXT_PUBLIC_APP_URL") {
            self.public.app_url = Some(url);
        }
        if let Some(key) = get("WEB3FORMS_ACCESS_KEY") {
            self.contact.access_key = Some(key);
        }
    }

    /// Check required settings
    pub fn validate(&self) -> Result<()> {
        if self.backend.url.is_empty() {
            return Err(Error::ConfigError {
                message: "BACKEND_URL is required".to_string(),
            });
        }

        let parsed = url::Url::parse(&self.backend.url).map_err(|e| Error::ConfigError {
            message: format!("BACKEND_URL is not a valid URL: {}", e),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::ConfigError {
                message: format!("BACKEND_URL must use http or https, got {}", parsed.scheme()),
            });
        }

        if self.backend.timeout_secs == 0 {
            return Err(Error::ConfigError {
                message: "backend timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Backend base URL without a trailing slash
    pub fn backend_url(&self) -> &str {
        self.backend.url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::ConfigError {
                message: format!("Invalid bind address: {}", e),
            })
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("SECURECHAIN_CONFIG") {
            return Ok(PathBuf::from(path));
        }

        ProjectDirs::from("dev", "securechain", "securechain")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine securechain config directory".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_backend_url_required() {
        let err = Config::load_from(None, &HashMap::new()).unwrap_err();
        assert_eq!(err.code(), "config_error");
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::load_from(
            None,
            &vars(&[
                ("BACKEND_URL", "http://backend:8000/"),
                ("NODE_ENV", "production"),
                ("PORT", "8080"),
                ("WEB3FORMS_ACCESS_KEY", "abc"),
            ]),
        )
        .unwrap();

        assert_eq!(config.backend_url(), "http://backend:8000");
        assert!(config.environment.is_production());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.contact.access_key.as_deref(), Some("abc"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let err = Config::load_from(None, &vars(&[("BACKEND_URL", "ftp://backend")])).unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
environment = "production"

[backend]
url = "https://file-backend"
timeout_secs = 10

[server]
port = 4000
"#
        )
        .unwrap();

        let config = Config::load_from(Some(file.path()), &vars(&[("PORT", "5000")])).unwrap();
        assert_eq!(config.backend_url(), "https://file-backend");
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.cookies.access_max_age_secs, ACCESS_TOKEN_MAX_AGE_SECS);
        assert!(config.environment.is_production());
    }
}
