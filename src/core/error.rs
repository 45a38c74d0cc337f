//! Error types for Secure Chain
//!
//! Every variant carries a stable snake_case code. Route handlers return
//! these directly; the `IntoResponse` impl turns them into a
//! `{ "code", "message" }` JSON body with the matching status.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::graph::GraphError;

/// Result type alias using Secure Chain's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Secure Chain error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Access token expired and could not be refreshed")]
    TokenExpired,

    #[error("No access token provided")]
    MissingToken,

    #[error("No refresh token provided")]
    MissingRefreshToken,

    /// Error reported by a backend service, passed through verbatim
    #[error("Backend error ({status}): {message}")]
    Backend {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameter { field: String, message: String },

    #[error("An operation is already in progress")]
    OperationInProgress,

    #[error("No route for {path}")]
    RouteNotFound { path: String },

    #[error("Graph session not found: {id}")]
    SessionNotFound { id: String },

    #[error("Contact form is not configured")]
    ContactNotConfigured,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Stable error code surfaced to clients
    pub fn code(&self) -> &str {
        match self {
            Error::ConfigError { .. } => "config_error",
            Error::Network { .. } => "network_error",
            Error::Unauthorized { .. } => "unauthorized",
            Error::TokenExpired => "token_expired",
            Error::MissingToken => "missing_token",
            Error::MissingRefreshToken => "missing_refresh_token",
            Error::Backend { code, .. } => code,
            Error::InvalidParameter { .. } => "invalid_parameter",
            Error::OperationInProgress => "operation_in_progress",
            Error::RouteNotFound { .. } => "not_found",
            Error::SessionNotFound { .. } => "session_not_found",
            Error::ContactNotConfigured => "contact_not_configured",
            Error::Graph(e) => e.code(),
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::TomlParse(_) => "config_error",
        }
    }

    /// HTTP status used when this error reaches the route layer
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthorized { .. }
            | Error::TokenExpired
            | Error::MissingToken
            | Error::MissingRefreshToken => StatusCode::UNAUTHORIZED,
            Error::Backend { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Error::OperationInProgress => StatusCode::CONFLICT,
            Error::SessionNotFound { .. } | Error::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Error::Graph(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message without the variant prefix, for backend pass-through
    pub fn message(&self) -> String {
        match self {
            Error::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code().to_string(),
            message: self.message(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network {
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::invalid("body", rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::invalid("path", rejection.body_text())
    }
}

/// JSON error body returned by every route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(code = self.code(), status = status.as_u16(), "request failed");
        (status, Json(self.body())).into_response()
    }
}
