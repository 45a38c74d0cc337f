use axum::http::StatusCode;
use thiserror::Error;

use crate::core::error::Error;

/// Graph engine failures
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    #[error("Node limit reached ({limit} nodes displayed)")]
    NodeLimitReached { limit: usize },

    /// Neighbor fetch failed; the node stays collapsed and can be retried
    #[error("Failed to expand {id}: {source}")]
    Fetch {
        id: String,
        #[source]
        source: Box<Error>,
    },
}

impl GraphError {
    pub fn code(&self) -> &str {
        match self {
            GraphError::NodeNotFound { .. } => "node_not_found",
            GraphError::NodeLimitReached { .. } => "node_limit_reached",
            GraphError::Fetch { source, .. } => source.code(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GraphError::NodeNotFound { .. } => StatusCode::NOT_FOUND,
            GraphError::NodeLimitReached { .. } => StatusCode::CONFLICT,
            GraphError::Fetch { source, .. } => source.status(),
        }
    }
}
