//! Summary figures for the graph legend/statistics panel

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::types::GraphData;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub packages: usize,
    pub versions: usize,
    /// Versions with at least one known vulnerability
    pub vulnerable_versions: usize,
    /// Distinct vulnerability identifiers across all versions
    pub vulnerabilities: usize,
    pub nodes_by_type: BTreeMap<String, usize>,
    pub edges_by_type: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn compute(data: &GraphData) -> Self {
        let mut stats = GraphStats {
            total_nodes: data.nodes.len(),
            total_edges: data.edges.len(),
            ..Default::default()
        };

        let mut vuln_ids: HashSet<&str> = HashSet::new();
        for node in &data.nodes {
            *stats
                .nodes_by_type
                .entry(node.node_type.as_str().to_string())
                .or_default() += 1;

            if node.node_type.is_version() {
                stats.versions += 1;
                let vulns = node.vulnerabilities();
                if !vulns.is_empty() {
                    stats.vulnerable_versions += 1;
                }
                vuln_ids.extend(vulns);
            } else if node.node_type.is_package() {
                stats.packages += 1;
            }
        }
        stats.vulnerabilities = vuln_ids.len();

        for edge in &data.edges {
            *stats
                .edges_by_type
                .entry(edge.edge_type.as_str().to_string())
                .or_default() += 1;
        }

        stats
    }
}
