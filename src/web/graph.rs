//! Graph view routes
//!
//! One session per open graph view. Expansion fetches neighbors from
//! Depex as the calling user.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::ValidToken;
use crate::core::error::{Error, Result};
use crate::graph::{
    CollapseSummary, DepexNeighborSource, ExpandOutcome, GraphEdge, GraphNode, GraphSession,
    GraphStats, NodeState, NodeType, SharedGraph, MAX_NODES,
};
use crate::operations::validate;
use crate::web::extract::{JsonBody, PathParam};
use crate::web::server::AppState;

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub package_name: String,
    pub purl: String,
    pub node_type: NodeType,
}

#[derive(Debug, Deserialize)]
pub struct NodeRequest {
    pub node_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub show_only_latest: bool,
}

#[derive(Debug, Serialize)]
pub struct NodeView {
    #[serde(flatten)]
    pub node: GraphNode,
    pub state: NodeState,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub root_id: String,
    pub show_only_latest: bool,
    pub max_nodes: usize,
    pub at_limit: bool,
    pub expanded: usize,
    pub loading: usize,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<GraphEdge>,
}

impl SessionView {
    fn of(id: Uuid, session: &GraphSession) -> Self {
        let view = session.view();
        let nodes = view
            .nodes
            .into_iter()
            .map(|node| {
                let state = session.node_state(&node.id).unwrap_or(NodeState::Collapsed);
                NodeView { node, state }
            })
            .collect();

        Self {
            id,
            root_id: session.root_id().to_string(),
            show_only_latest: session.show_only_latest(),
            max_nodes: MAX_NODES,
            at_limit: session.is_at_limit(),
            expanded: session.expanded_count(),
            loading: session.loading_count(),
            nodes,
            edges: view.edges,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpandResponse {
    pub outcome: ExpandOutcome,
    pub graph: SessionView,
}

#[derive(Debug, Serialize)]
pub struct CollapseResponse {
    pub collapsed: CollapseSummary,
    pub graph: SessionView,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    /// Non-latest versions collapsed by enabling the filter
    pub collapsed: Vec<String>,
    pub graph: SessionView,
}

fn snapshot(id: Uuid, graph: &SharedGraph) -> SessionView {
    graph.read(|session| SessionView::of(id, session))
}

// =============================================================================
// HANDLERS
// =============================================================================

pub async fn api_open_session(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    JsonBody(request): JsonBody<OpenSessionRequest>,
) -> Result<Response> {
    if !request.node_type.is_package() {
        return Err(Error::invalid("node_type", "must be a package ecosystem"));
    }
    let purl = validate::required("purl", Some(request.purl.as_str()))?;
    let name = validate::required("package_name", Some(request.package_name.as_str()))?;

    let root = GraphNode::new(purl, name, request.node_type).with_prop("purl", purl);
    let (id, graph) = state.graphs.open(&token.owner(), root);
    Ok((StatusCode::CREATED, Json(snapshot(id, &graph))).into_response())
}

pub async fn api_get_session(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<SessionView>> {
    let graph = state.graphs.get(&id, &token.owner())?;
    Ok(Json(snapshot(id, &graph)))
}

pub async fn api_session_stats(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<GraphStats>> {
    let graph = state.graphs.get(&id, &token.owner())?;
    Ok(Json(graph.read(GraphSession::stats)))
}

pub async fn api_close_session(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode> {
    if state.graphs.close(&id, &token.owner()) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::SessionNotFound { id: id.to_string() })
    }
}

pub async fn api_expand_node(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<NodeRequest>,
) -> Result<Json<ExpandResponse>> {
    let graph = state.graphs.get(&id, &token.owner())?;
    let ecosystem = graph.read(GraphSession::ecosystem);
    let source = DepexNeighborSource::new(state.client.clone(), token.access_token, ecosystem);

    let outcome = graph.expand_node(&request.node_id, &source).await?;
    Ok(Json(ExpandResponse {
        outcome,
        graph: snapshot(id, &graph),
    }))
}

pub async fn api_collapse_node(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<NodeRequest>,
) -> Result<Json<CollapseResponse>> {
    let graph = state.graphs.get(&id, &token.owner())?;
    let collapsed = graph.collapse_node(&request.node_id)?;
    Ok(Json(CollapseResponse {
        collapsed,
        graph: snapshot(id, &graph),
    }))
}

pub async fn api_set_filter(
    State(state): State<AppState>,
    Extension(token): Extension<ValidToken>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<FilterRequest>,
) -> Result<Json<FilterResponse>> {
    let graph = state.graphs.get(&id, &token.owner())?;
    let collapsed = graph.set_show_only_latest(request.show_only_latest);
    Ok(Json(FilterResponse {
        collapsed,
        graph: snapshot(id, &graph),
    }))
}
