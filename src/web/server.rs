//! Axum server for the Secure Chain API layer

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::auth::{with_auth, AuthBackend, AuthState, CookiePolicy};
use crate::client::{ApiClient, BackendResponse};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::graph::GraphSessions;
use crate::web::auth::{
    api_account_exists, api_change_password, api_check_token, api_login, api_logout,
    api_refresh_token, api_signup,
};
use crate::web::contact::{api_contact, ContactRelay};
use crate::web::graph::{
    api_collapse_node, api_close_session, api_expand_node, api_get_session, api_open_session,
    api_session_stats, api_set_filter,
};
use crate::web::proxy::api_forward;

// =============================================================================
// STATE
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Client for the backend gateway
    pub client: ApiClient,
    pub auth: AuthState,
    pub graphs: GraphSessions,
    pub contact: ContactRelay,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(config.backend_url(), config.request_timeout())?;
        let auth = AuthState {
            backend: AuthBackend::new(client.clone()),
            cookies: CookiePolicy::from_config(&config),
        };
        let contact = ContactRelay::from_config(&config)?;

        Ok(Self {
            config: Arc::new(config),
            client,
            auth,
            graphs: GraphSessions::new(),
            contact,
        })
    }
}

// =============================================================================
// SHARED RESPONSES
// =============================================================================

/// Relay a backend reply with its status, content headers and bytes untouched
pub(crate) fn pass_through(response: &BackendResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut relayed = (status, Body::from(response.raw.clone())).into_response();

    let headers = relayed.headers_mut();
    let content = [
        (header::CONTENT_TYPE, response.content_type.as_deref()),
        (header::CONTENT_DISPOSITION, response.content_disposition.as_deref()),
    ];
    for (name, value) in content {
        if let Some(value) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
            headers.insert(name, value);
        }
    }
    relayed
}

async fn api_not_found(uri: Uri) -> Error {
    Error::RouteNotFound {
        path: uri.path().to_string(),
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub environment: &'static str,
    pub version: &'static str,
    pub time: chrono::DateTime<chrono::Utc>,
}

async fn api_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        environment: state.config.environment.as_str(),
        version: env!("CARGO_PKG_VERSION"),
        time: chrono::Utc::now(),
    })
}

// =============================================================================
// ROUTER
// =============================================================================

pub fn build_router(state: AppState) -> Router {
    let guard = middleware::from_fn_with_state(state.auth.clone(), with_auth);

    let protected = Router::new()
        .route("/api/auth/change_password", post(api_change_password))
        .route("/api/depex/*rest", any(api_forward))
        .route("/api/vexgen/*rest", any(api_forward))
        .route("/api/graph/sessions", post(api_open_session))
        .route(
            "/api/graph/sessions/:id",
            get(api_get_session).delete(api_close_session),
        )
        .route("/api/graph/sessions/:id/stats", get(api_session_stats))
        .route("/api/graph/sessions/:id/expand", post(api_expand_node))
        .route("/api/graph/sessions/:id/collapse", post(api_collapse_node))
        .route("/api/graph/sessions/:id/filter", put(api_set_filter))
        .route_layer(guard);

    let public = Router::new()
        .route("/api/health", get(api_health))
        .route("/api/auth/login", post(api_login))
        .route("/api/auth/logout", post(api_logout))
        .route("/api/auth/signup", post(api_signup))
        .route("/api/auth/check_token", post(api_check_token))
        .route("/api/auth/refresh_token", post(api_refresh_token))
        .route("/api/auth/account_exists", post(api_account_exists))
        .route("/api/contact", post(api_contact));

    public
        .merge(protected)
        .fallback(api_not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Credentialed CORS for the web application's origin, if one is configured
fn cors_layer(app_url: Option<&str>) -> CorsLayer {
    let Some(origin) = app_url.and_then(|url| HeaderValue::from_str(url.trim_end_matches('/')).ok())
    else {
        return CorsLayer::new();
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Serve until interrupted
pub async fn run(config: Config, open_browser: bool) -> Result<()> {
    let addr = config.bind_addr()?;
    let environment = config.environment;
    let backend = config.backend_url().to_string();

    let cors = cors_layer(config.public.app_url.as_deref());

    let app = build_router(AppState::new(config)?).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        environment = environment.as_str(),
        backend = %backend,
        "securechain API listening"
    );

    if open_browser {
        let url = format!("http://{}/api/health", addr);
        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {}", e);
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
