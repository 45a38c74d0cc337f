//! User-facing messages
//!
//! Message keys form a closed enum, so a missing translation is a
//! compile error rather than a silently echoed key. Codes that have no
//! key (unknown backend codes) fall back to the raw message.

use std::fmt;
use std::str::FromStr;

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s.split(['-', '_']).next().unwrap_or(s);
        match lang.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Es => write!(f, "es"),
        }
    }
}

/// Every translatable message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    NetworkError,
    Unauthorized,
    TokenExpired,
    MissingToken,
    MissingRefreshToken,
    InvalidParameter,
    OperationInProgress,
    NodeNotFound,
    NodeLimitReached,
    SessionNotFound,
    ContactNotConfigured,
    PackageNotFound,
    RepositoryNotFound,
    MemoryOut,
    SmtTimeout,
    DateNotFound,
}

impl MessageKey {
    pub const ALL: &'static [MessageKey] = &[
        MessageKey::NetworkError,
        MessageKey::Unauthorized,
        MessageKey::TokenExpired,
        MessageKey::MissingToken,
        MessageKey::MissingRefreshToken,
        MessageKey::InvalidParameter,
        MessageKey::OperationInProgress,
        MessageKey::NodeNotFound,
        MessageKey::NodeLimitReached,
        MessageKey::SessionNotFound,
        MessageKey::ContactNotConfigured,
        MessageKey::PackageNotFound,
        MessageKey::RepositoryNotFound,
        MessageKey::MemoryOut,
        MessageKey::SmtTimeout,
        MessageKey::DateNotFound,
    ];

    /// Error code this key translates
    pub fn code(&self) -> &'static str {
        match self {
            MessageKey::NetworkError => "network_error",
            MessageKey::Unauthorized => "unauthorized",
            MessageKey::TokenExpired => "token_expired",
            MessageKey::MissingToken => "missing_token",
            MessageKey::MissingRefreshToken => "missing_refresh_token",
            MessageKey::InvalidParameter => "invalid_parameter",
            MessageKey::OperationInProgress => "operation_in_progress",
            MessageKey::NodeNotFound => "node_not_found",
            MessageKey::NodeLimitReached => "node_limit_reached",
            MessageKey::SessionNotFound => "session_not_found",
            MessageKey::ContactNotConfigured => "contact_not_configured",
            MessageKey::PackageNotFound => "package_not_found",
            MessageKey::RepositoryNotFound => "repository_not_found",
            MessageKey::MemoryOut => "memory_out",
            MessageKey::SmtTimeout => "smt_timeout",
            MessageKey::DateNotFound => "date_not_found",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }
}

/// Look up a message
pub fn translate(locale: Locale, key: MessageKey) -> &'static str {
    use MessageKey::*;
    match (locale, key) {
        (Locale::En, NetworkError) => "Could not reach the server. Check your connection.",
        (Locale::En, Unauthorized) => "You need to sign in to continue.",
        (Locale::En, TokenExpired) => "Your session has expired. Please sign in again.",
        (Locale::En, MissingToken) => "No session token was provided.",
        (Locale::En, MissingRefreshToken) => "No refresh token was provided.",
        (Locale::En, InvalidParameter) => "Some parameters are invalid.",
        (Locale::En, OperationInProgress) => "An operation is already running.",
        (Locale::En, NodeNotFound) => "The selected node is not in the graph.",
        (Locale::En, NodeLimitReached) => "Node limit reached. Collapse some nodes first.",
        (Locale::En, SessionNotFound) => "The graph view is no longer open.",
        (Locale::En, ContactNotConfigured) => "The contact form is not available.",
        (Locale::En, PackageNotFound) => "Package not found.",
        (Locale::En, RepositoryNotFound) => "Repository not found.",
        (Locale::En, MemoryOut) => "The operation ran out of memory.",
        (Locale::En, SmtTimeout) => "The solver timed out.",
        (Locale::En, DateNotFound) => "No data found for the requested date.",

        (Locale::Es, NetworkError) => "No se pudo contactar con el servidor. Revisa tu conexión.",
        (Locale::Es, Unauthorized) => "Necesitas iniciar sesión para continuar.",
        (Locale::Es, TokenExpired) => "Tu sesión ha caducado. Inicia sesión de nuevo.",
        (Locale::Es, MissingToken) => "No se proporcionó un token de sesión.",
        (Locale::Es, MissingRefreshToken) => "No se proporcionó un token de refresco.",
        (Locale::Es, InvalidParameter) => "Algunos parámetros no son válidos.",
        (Locale::Es, OperationInProgress) => "Ya hay una operación en curso.",
        (Locale::Es, NodeNotFound) => "El nodo seleccionado no está en el grafo.",
        (Locale::Es, NodeLimitReached) => "Límite de nodos alcanzado. Contrae algunos nodos primero.",
        (Locale::Es, SessionNotFound) => "La vista del grafo ya no está abierta.",
        (Locale::Es, ContactNotConfigured) => "El formulario de contacto no está disponible.",
        (Locale::Es, PackageNotFound) => "Paquete no encontrado.",
        (Locale::Es, RepositoryNotFound) => "Repositorio no encontrado.",
        (Locale::Es, MemoryOut) => "La operación se quedó sin memoria.",
        (Locale::Es, SmtTimeout) => "El resolvedor agotó el tiempo.",
        (Locale::Es, DateNotFound) => "No hay datos para la fecha indicada.",
    }
}

/// Translate an error code, falling back to the raw message
pub fn localize_error(locale: Locale, code: &str, raw_message: &str) -> String {
    match MessageKey::from_code(code) {
        Some(key) => translate(locale, key).to_string(),
        None if raw_message.is_empty() => code.to_string(),
        None => raw_message.to_string(),
    }
}
