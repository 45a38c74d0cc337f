//! Incremental graph state for one open view
//!
//! A session is seeded with the root package and grows one hop at a time.
//! Per node the lifecycle is `Collapsed -> Loading -> Expanded`, with
//! `Expanded -> Collapsed` on collapse and `Loading -> Collapsed` when the
//! fetch fails or is abandoned.
//!
//! Expansion is split in two so the fetch can happen without holding the
//! session: [`GraphSession::begin_expand`] marks the node as loading and
//! [`GraphSession::finish_expand`] merges the result.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use super::error::GraphError;
use super::filter::{latest_versions_only, superseded_versions};
use super::stats::GraphStats;
use super::types::{GraphData, GraphEdge, GraphNode, NodeType};
use crate::core::error::Error;

/// Display ceiling for a single view
pub const MAX_NODES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Collapsed,
    Loading,
    Expanded,
}

/// Result of [`GraphSession::begin_expand`]
#[derive(Debug, Clone, PartialEq)]
pub enum ExpandStart {
    /// Node is now loading; fetch its neighbors
    Started(GraphNode),
    AlreadyExpanded,
    AlreadyLoading,
    /// Superseded version hidden by the latest-version filter
    Hidden,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub nodes_added: usize,
    pub nodes_refreshed: usize,
    pub edges_added: usize,
    /// Edges skipped because an endpoint is not in the graph
    pub edges_dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpandOutcome {
    Expanded { summary: MergeSummary },
    AlreadyExpanded,
    AlreadyLoading,
    /// The node is hidden by the latest-version filter; nothing fetched
    Hidden,
    /// The node was pruned while its fetch was in flight
    Discarded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollapseSummary {
    pub nodes_removed: Vec<String>,
    pub edges_removed: usize,
}

#[derive(Debug, Clone)]
pub struct GraphSession {
    root_id: String,
    ecosystem: NodeType,
    nodes: Vec<GraphNode>,
    node_ids: HashSet<String>,
    edges: Vec<GraphEdge>,
    edge_ids: HashSet<String>,
    fetched: HashSet<String>,
    loading: HashSet<String>,
    show_only_latest: bool,
}

impl GraphSession {
    /// Start a view seeded with the root package node
    pub fn new(root: GraphNode) -> Self {
        let mut node_ids = HashSet::new();
        node_ids.insert(root.id.clone());
        Self {
            root_id: root.id.clone(),
            ecosystem: root.node_type,
            nodes: vec![root],
            node_ids,
            edges: Vec::new(),
            edge_ids: HashSet::new(),
            fetched: HashSet::new(),
            loading: HashSet::new(),
            show_only_latest: false,
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Ecosystem of the root package
    pub fn ecosystem(&self) -> NodeType {
        self.ecosystem
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        if !self.node_ids.contains(id) {
            return None;
        }
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_ids.contains(id)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_state(&self, id: &str) -> Option<NodeState> {
        if !self.node_ids.contains(id) {
            None
        } else if self.loading.contains(id) {
            Some(NodeState::Loading)
        } else if self.fetched.contains(id) {
            Some(NodeState::Expanded)
        } else {
            Some(NodeState::Collapsed)
        }
    }

    pub fn expanded_count(&self) -> usize {
        self.fetched.len()
    }

    pub fn loading_count(&self) -> usize {
        self.loading.len()
    }

    pub fn show_only_latest(&self) -> bool {
        self.show_only_latest
    }

    /// Nodes the user actually sees, after the latest-version filter
    pub fn displayed_node_count(&self) -> usize {
        if self.show_only_latest {
            self.nodes.len() - superseded_versions(&self.nodes, &self.edges).len()
        } else {
            self.nodes.len()
        }
    }

    pub fn is_at_limit(&self) -> bool {
        self.displayed_node_count() >= MAX_NODES
    }

    /// Unfiltered node/edge set
    pub fn raw(&self) -> GraphData {
        GraphData {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Node/edge set to render
    pub fn view(&self) -> GraphData {
        let raw = self.raw();
        if self.show_only_latest {
            latest_versions_only(&raw)
        } else {
            raw
        }
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats::compute(&self.view())
    }

    /// Claim `id` for expansion
    ///
    /// Already expanded or loading nodes short-circuit regardless of the
    /// budget; anything else is refused once the displayed view is full.
    pub fn begin_expand(&mut self, id: &str) -> Result<ExpandStart, GraphError> {
        let node = self
            .node(id)
            .cloned()
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })?;

        if self.fetched.contains(id) {
            return Ok(ExpandStart::AlreadyExpanded);
        }
        if self.loading.contains(id) {
            return Ok(ExpandStart::AlreadyLoading);
        }
        if self.show_only_latest && superseded_versions(&self.nodes, &self.edges).contains(id) {
            return Ok(ExpandStart::Hidden);
        }
        if self.is_at_limit() {
            return Err(GraphError::NodeLimitReached { limit: MAX_NODES });
        }

        self.loading.insert(id.to_string());
        debug!(node = id, "expanding");
        Ok(ExpandStart::Started(node))
    }

    /// Apply the fetch result for a node claimed by `begin_expand`
    pub fn finish_expand(
        &mut self,
        id: &str,
        result: Result<GraphData, Error>,
    ) -> Result<ExpandOutcome, GraphError> {
        let was_loading = self.loading.remove(id);

        let data = result.map_err(|e| GraphError::Fetch {
            id: id.to_string(),
            source: Box::new(e),
        })?;

        if !was_loading || !self.node_ids.contains(id) {
            debug!(node = id, "discarding neighbors for pruned node");
            return Ok(ExpandOutcome::Discarded);
        }

        let summary = self.merge(data);
        self.fetched.insert(id.to_string());
        debug!(
            node = id,
            nodes_added = summary.nodes_added,
            edges_added = summary.edges_added,
            "expanded"
        );
        Ok(ExpandOutcome::Expanded { summary })
    }

    /// Release a claim whose fetch will never be finished
    ///
    /// Returns the node to `Collapsed` so it can be expanded again.
    pub fn abandon_expand(&mut self, id: &str) -> bool {
        let released = self.loading.remove(id);
        if released {
            debug!(node = id, "expansion abandoned");
        }
        released
    }

    /// Merge fetched nodes and edges, skipping duplicates by id
    ///
    /// Known nodes get their props refreshed. Edges are only added when
    /// both endpoints are present.
    pub fn merge(&mut self, data: GraphData) -> MergeSummary {
        let mut summary = MergeSummary::default();

        for node in data.nodes {
            if self.node_ids.contains(&node.id) {
                if let Some(existing) = self.nodes.iter_mut().find(|n| n.id == node.id) {
                    existing.props = node.props;
                    summary.nodes_refreshed += 1;
                }
                continue;
            }
            self.node_ids.insert(node.id.clone());
            self.nodes.push(node);
            summary.nodes_added += 1;
        }

        for mut edge in data.edges {
            if edge.id.is_empty() {
                edge.id = edge.derived_id();
            }
            if self.edge_ids.contains(&edge.id) {
                continue;
            }
            if !self.node_ids.contains(&edge.source) || !self.node_ids.contains(&edge.target) {
                summary.edges_dropped += 1;
                continue;
            }
            self.edge_ids.insert(edge.id.clone());
            self.edges.push(edge);
            summary.edges_added += 1;
        }

        summary
    }

    /// Undo the expansion of `id`
    ///
    /// Drops the node's outgoing edges, then removes whatever is no longer
    /// reachable from the root. Dependencies shared with another expanded
    /// path survive. Collapsing a node that is not expanded is a no-op.
    pub fn collapse(&mut self, id: &str) -> Result<CollapseSummary, GraphError> {
        if !self.node_ids.contains(id) {
            return Err(GraphError::NodeNotFound { id: id.to_string() });
        }
        if !self.fetched.remove(id) {
            return Ok(CollapseSummary::default());
        }

        let before = self.edges.len();
        let edge_ids = &mut self.edge_ids;
        self.edges.retain(|e| {
            if e.source == id {
                edge_ids.remove(&e.id);
                false
            } else {
                true
            }
        });
        let outgoing = before - self.edges.len();

        let (nodes_removed, pruned_edges) = self.prune_unreachable();
        debug!(
            node = id,
            nodes_removed = nodes_removed.len(),
            "collapsed"
        );

        Ok(CollapseSummary {
            nodes_removed,
            edges_removed: outgoing + pruned_edges,
        })
    }

    /// Remove nodes (and their edges) not reachable from the root
    fn prune_unreachable(&mut self) -> (Vec<String>, usize) {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            adjacency
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }

        let mut reachable: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        reachable.insert(self.root_id.clone());
        queue.push_back(self.root_id.as_str());

        while let Some(current) = queue.pop_front() {
            if let Some(targets) = adjacency.get(current) {
                for &target in targets {
                    if reachable.insert(target.to_string()) {
                        queue.push_back(target);
                    }
                }
            }
        }

        let removed: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| !reachable.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        if removed.is_empty() {
            return (removed, 0);
        }

        self.nodes.retain(|n| reachable.contains(&n.id));
        for id in &removed {
            self.node_ids.remove(id);
            self.fetched.remove(id);
            self.loading.remove(id);
        }

        let before = self.edges.len();
        let edge_ids = &mut self.edge_ids;
        self.edges.retain(|e| {
            let keep = reachable.contains(&e.source) && reachable.contains(&e.target);
            if !keep {
                edge_ids.remove(&e.id);
            }
            keep
        });

        (removed, before - self.edges.len())
    }

    /// Toggle the latest-version filter
    ///
    /// Enabling it also collapses every expanded version that the filter
    /// hides, so hidden subtrees stop counting against the budget.
    /// Returns the ids collapsed that way.
    pub fn set_show_only_latest(&mut self, enabled: bool) -> Vec<String> {
        self.show_only_latest = enabled;
        if !enabled {
            return Vec::new();
        }

        let mut hidden: Vec<String> = superseded_versions(&self.nodes, &self.edges)
            .into_iter()
            .filter(|id| self.fetched.contains(id))
            .collect();
        hidden.sort();

        let mut collapsed = Vec::new();
        for id in hidden {
            if self.fetched.contains(&id) && self.collapse(&id).is_ok() {
                collapsed.push(id);
            }
        }
        collapsed
    }
}
