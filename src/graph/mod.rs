//! Dependency graph engine
//!
//! Keeps a bounded, incrementally expandable view of one root package's
//! dependency graph. Rendering is someone else's job: consumers read
//! [`GraphSession::view`] and draw it however they like.

mod error;
mod filter;
mod registry;
mod session;
mod shared;
mod source;
mod stats;
mod types;

pub use error::GraphError;
pub use filter::{latest_versions_only, superseded_versions};
pub use registry::{GraphSessions, MAX_SESSIONS_PER_OWNER, SESSION_IDLE_TTL};
pub use session::{
    CollapseSummary, ExpandOutcome, ExpandStart, GraphSession, MergeSummary, NodeState, MAX_NODES,
};
pub use shared::SharedGraph;
pub use source::{DepexNeighborSource, NeighborSource, PACKAGE_EXPAND_PATH, VERSION_EXPAND_PATH};
pub use stats::GraphStats;
pub use types::{EdgeType, GraphData, GraphEdge, GraphNode, NodeType, Props};
