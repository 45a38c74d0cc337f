//! Where neighbor nodes come from
//!
//! The engine only sees [`NeighborSource`]; the Depex-backed
//! implementation lives here too.

use async_trait::async_trait;
use serde::Serialize;

use super::types::{GraphData, GraphNode, NodeType};
use crate::client::ApiClient;
use crate::core::error::Result;

/// Endpoint expanding a package node into its versions
pub const PACKAGE_EXPAND_PATH: &str = "/depex/graph/package/expand";

/// Endpoint expanding a version node into its dependencies
pub const VERSION_EXPAND_PATH: &str = "/depex/graph/version/expand";

/// Fetches the one-hop neighborhood of a node
#[async_trait]
pub trait NeighborSource: Send + Sync {
    async fn fetch_neighbors(&self, node: &GraphNode) -> Result<GraphData>;
}

#[derive(Debug, Serialize)]
struct PackageExpandRequest<'a> {
    node_type: &'a str,
    package_purl: &'a str,
}

#[derive(Debug, Serialize)]
struct VersionExpandRequest<'a> {
    node_type: &'a str,
    version_purl: &'a str,
}

/// Neighbor source backed by the Depex service, authenticated as the caller
pub struct DepexNeighborSource {
    client: ApiClient,
    token: String,
    ecosystem: NodeType,
}

impl DepexNeighborSource {
    pub fn new(client: ApiClient, token: impl Into<String>, ecosystem: NodeType) -> Self {
        Self {
            client,
            token: token.into(),
            ecosystem,
        }
    }
}

#[async_trait]
impl NeighborSource for DepexNeighborSource {
    async fn fetch_neighbors(&self, node: &GraphNode) -> Result<GraphData> {
        if node.node_type.is_version() {
            let body = VersionExpandRequest {
                node_type: self.ecosystem.as_str(),
                version_purl: node.purl(),
            };
            self.client
                .post_json(VERSION_EXPAND_PATH, &body, Some(&self.token))
                .await
        } else {
            let node_type = if node.node_type.is_package() {
                node.node_type
            } else {
                self.ecosystem
            };
            let body = PackageExpandRequest {
                node_type: node_type.as_str(),
                package_purl: node.purl(),
            };
            self.client
                .post_json(PACKAGE_EXPAND_PATH, &body, Some(&self.token))
                .await
        }
    }
}
