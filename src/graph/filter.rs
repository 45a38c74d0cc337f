//! "Show only latest version" view filter

use std::collections::{HashMap, HashSet};

use super::types::{EdgeType, GraphData, GraphEdge, GraphNode};

/// Version ids hidden by the latest-version filter
///
/// Versions are grouped by the package owning them through `HAVE` edges;
/// per package only the highest `serial_number` survives. Unnumbered
/// versions lose to numbered ones, ties keep the first in edge order.
pub fn superseded_versions(nodes: &[GraphNode], edges: &[GraphEdge]) -> HashSet<String> {
    let versions: HashMap<&str, &GraphNode> = nodes
        .iter()
        .filter(|n| n.node_type.is_version())
        .map(|n| (n.id.as_str(), n))
        .collect();

    let mut groups: HashMap<&str, Vec<&GraphNode>> = HashMap::new();
    for edge in edges {
        if edge.edge_type != EdgeType::Have {
            continue;
        }
        if let Some(&version) = versions.get(edge.target.as_str()) {
            let group = groups.entry(edge.source.as_str()).or_default();
            if !group.iter().any(|v| v.id == version.id) {
                group.push(version);
            }
        }
    }

    // A version owned by several packages stays visible if any owner keeps it
    let mut latest: HashSet<&str> = HashSet::new();
    let mut grouped: HashSet<&str> = HashSet::new();
    for group in groups.values() {
        grouped.extend(group.iter().map(|v| v.id.as_str()));
        if let Some(best) = group
            .iter()
            .copied()
            .reduce(|best, c| if c.serial_number() > best.serial_number() { c } else { best })
        {
            latest.insert(best.id.as_str());
        }
    }

    grouped
        .difference(&latest)
        .map(|id| id.to_string())
        .collect()
}

/// Filtered copy of `data` keeping only the latest version per package
pub fn latest_versions_only(data: &GraphData) -> GraphData {
    let hidden = superseded_versions(&data.nodes, &data.edges);
    if hidden.is_empty() {
        return data.clone();
    }

    let nodes: Vec<GraphNode> = data
        .nodes
        .iter()
        .filter(|n| !hidden.contains(&n.id))
        .cloned()
        .collect();
    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges = data
        .edges
        .iter()
        .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
        .cloned()
        .collect();

    GraphData { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::NodeType;

    fn version(id: &str, serial: i64) -> GraphNode {
        GraphNode::new(id, id, NodeType::Version).with_prop("serial_number", serial)
    }

    fn sample() -> GraphData {
        let pkg = GraphNode::new("pkg:pypi/flask", "flask", NodeType::PyPIPackage);
        let dep = GraphNode::new("pkg:pypi/click", "click", NodeType::PyPIPackage);
        GraphData {
            nodes: vec![
                pkg,
                version("flask@1.0", 1),
                version("flask@3.0", 7),
                version("flask@2.0", 4),
                dep,
            ],
            edges: vec![
                GraphEdge::new("pkg:pypi/flask", "flask@1.0", EdgeType::Have),
                GraphEdge::new("pkg:pypi/flask", "flask@3.0", EdgeType::Have),
                GraphEdge::new("pkg:pypi/flask", "flask@2.0", EdgeType::Have),
                GraphEdge::new("flask@1.0", "pkg:pypi/click", EdgeType::DependsOn),
                GraphEdge::new("flask@3.0", "pkg:pypi/click", EdgeType::DependsOn),
            ],
        }
    }

    #[test]
    fn test_keeps_highest_serial() {
        let filtered = latest_versions_only(&sample());
        let ids: Vec<&str> = filtered.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["pkg:pypi/flask", "flask@3.0", "pkg:pypi/click"]);
        assert_eq!(filtered.edges.len(), 2);
        assert!(filtered
            .edges
            .iter()
            .all(|e| e.source != "flask@1.0" && e.target != "flask@1.0"));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = latest_versions_only(&sample());
        let twice = latest_versions_only(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unnumbered_loses() {
        let mut data = sample();
        data.nodes.push(GraphNode::new("flask@dev", "dev", NodeType::Version));
        data.edges
            .push(GraphEdge::new("pkg:pypi/flask", "flask@dev", EdgeType::Have));
        assert!(superseded_versions(&data.nodes, &data.edges).contains("flask@dev"));
    }

    #[test]
    fn test_orphan_versions_untouched() {
        let data = GraphData {
            nodes: vec![version("a@1", 1), version("a@2", 2)],
            edges: vec![],
        };
        assert_eq!(latest_versions_only(&data), data);
    }
}
