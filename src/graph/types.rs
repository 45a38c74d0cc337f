//! Graph data contract
//!
//! `{ nodes, edges }` as exchanged with the Depex backend and handed to
//! whatever renders the view.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Open attribute map attached to nodes and edges
pub type Props = BTreeMap<String, Value>;

/// Node discriminator: a package ecosystem tag or a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    PyPIPackage,
    NPMPackage,
    MavenPackage,
    CargoPackage,
    RubyGemsPackage,
    NuGetPackage,
    Version,
    #[serde(other)]
    Unknown,
}

impl NodeType {
    pub fn is_version(&self) -> bool {
        matches!(self, NodeType::Version)
    }

    pub fn is_package(&self) -> bool {
        !matches!(self, NodeType::Version | NodeType::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::PyPIPackage => "PyPIPackage",
            NodeType::NPMPackage => "NPMPackage",
            NodeType::MavenPackage => "MavenPackage",
            NodeType::CargoPackage => "CargoPackage",
            NodeType::RubyGemsPackage => "RubyGemsPackage",
            NodeType::NuGetPackage => "NuGetPackage",
            NodeType::Version => "Version",
            NodeType::Unknown => "Unknown",
        }
    }
}

impl FromStr for NodeType {
    type Err = String;

    /// Package ecosystems by tag (`PyPIPackage`) or short name (`pypi`)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let short = lower.strip_suffix("package").unwrap_or(&lower);
        match short {
            "pypi" => Ok(NodeType::PyPIPackage),
            "npm" => Ok(NodeType::NPMPackage),
            "maven" => Ok(NodeType::MavenPackage),
            "cargo" => Ok(NodeType::CargoPackage),
            "rubygems" => Ok(NodeType::RubyGemsPackage),
            "nuget" => Ok(NodeType::NuGetPackage),
            _ => Err(format!("unknown package ecosystem: {}", s)),
        }
    }
}

/// Relationship discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// package -> version
    #[serde(rename = "HAVE")]
    Have,
    /// version -> dependency package
    #[serde(rename = "DEPENDS_ON")]
    DependsOn,
    /// version -> dependency package (legacy name)
    #[serde(rename = "REQUIRE")]
    Require,
    #[serde(other)]
    Other,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Have => "HAVE",
            EdgeType::DependsOn => "DEPENDS_ON",
            EdgeType::Require => "REQUIRE",
            EdgeType::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub props: Props,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            props: Props::new(),
        }
    }

    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Package URL, falling back to the node id
    pub fn purl(&self) -> &str {
        self.prop_str("purl").unwrap_or(&self.id)
    }

    /// Release ordinal used to pick the latest version; accepts numbers or numeric strings
    pub fn serial_number(&self) -> Option<i64> {
        match self.props.get("serial_number")? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Vulnerability identifiers, either plain strings or `{ "id": .. }` objects
    pub fn vulnerabilities(&self) -> Vec<&str> {
        match self.props.get("vulnerabilities") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().or_else(|| v.get("id").and_then(Value::as_str)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(default)]
    pub props: Props,
}

impl GraphEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: EdgeType,
    ) -> Self {
        let mut edge = Self {
            id: String::new(),
            source: source.into(),
            target: target.into(),
            edge_type,
            props: Props::new(),
        };
        edge.id = edge.derived_id();
        edge
    }

    /// Id used when the backend omits one
    pub fn derived_id(&self) -> String {
        format!("{}-{}-{}", self.source, self.edge_type.as_str(), self.target)
    }
}

/// Node and edge collection, as fetched or as displayed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
