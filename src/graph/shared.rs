use parking_lot::Mutex;
use std::sync::Arc;

use super::error::GraphError;
use super::session::{CollapseSummary, ExpandOutcome, ExpandStart, GraphSession};
use super::source::NeighborSource;
use super::types::GraphData;
use crate::core::error::Error;

/// A session shared between concurrent requests for the same view
///
/// The lock is only held for state transitions, never across the fetch,
/// so expansions of different nodes proceed independently.
#[derive(Debug, Clone)]
pub struct SharedGraph {
    inner: Arc<Mutex<GraphSession>>,
}

impl SharedGraph {
    pub fn new(session: GraphSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&GraphSession) -> R) -> R {
        f(&self.inner.lock())
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut GraphSession) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Expand `id`, fetching its neighbors from `source`
    pub async fn expand_node(
        &self,
        id: &str,
        source: &dyn NeighborSource,
    ) -> Result<ExpandOutcome, GraphError> {
        let start = {
            let mut session = self.inner.lock();
            session.begin_expand(id)?
        };

        let node = match start {
            ExpandStart::Started(node) => node,
            ExpandStart::AlreadyExpanded => return Ok(ExpandOutcome::AlreadyExpanded),
            ExpandStart::AlreadyLoading => return Ok(ExpandOutcome::AlreadyLoading),
            ExpandStart::Hidden => return Ok(ExpandOutcome::Hidden),
        };

        // Releases the loading claim if this future is dropped mid-fetch
        let claim = LoadingClaim {
            session: &*self.inner,
            id,
            armed: true,
        };
        let result = source.fetch_neighbors(&node).await;
        claim.finish(result)
    }

    pub fn collapse_node(&self, id: &str) -> Result<CollapseSummary, GraphError> {
        self.inner.lock().collapse(id)
    }

    pub fn set_show_only_latest(&self, enabled: bool) -> Vec<String> {
        self.inner.lock().set_show_only_latest(enabled)
    }
}

struct LoadingClaim<'a> {
    session: &'a Mutex<GraphSession>,
    id: &'a str,
    armed: bool,
}

impl LoadingClaim<'_> {
    fn finish(mut self, result: Result<GraphData, Error>) -> Result<ExpandOutcome, GraphError> {
        self.armed = false;
        self.session.lock().finish_expand(self.id, result)
    }
}

impl Drop for LoadingClaim<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.lock().abandon_expand(self.id);
        }
    }
}
