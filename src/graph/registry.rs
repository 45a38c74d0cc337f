use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

use super::session::GraphSession;
use super::shared::SharedGraph;
use super::types::GraphNode;
use crate::core::error::{Error, Result};

/// Open views one account may hold before its least recently used is dropped
pub const MAX_SESSIONS_PER_OWNER: usize = 8;

/// Views untouched for this long are dropped
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Entry {
    owner: String,
    graph: SharedGraph,
    last_used: Instant,
}

/// Open graph views, one session per view, each owned by one account
///
/// A session is invisible to every other owner: `get` and `close` answer
/// `session_not_found` rather than revealing that the id exists.
#[derive(Debug, Clone)]
pub struct GraphSessions {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    max_per_owner: usize,
    idle_ttl: Duration,
}

impl Default for GraphSessions {
    fn default() -> Self {
        Self::with_limits(MAX_SESSIONS_PER_OWNER, SESSION_IDLE_TTL)
    }
}

impl GraphSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_per_owner: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            max_per_owner: max_per_owner.max(1),
            idle_ttl,
        }
    }

    /// Open a new view seeded with `root` for `owner`
    pub fn open(&self, owner: &str, root: GraphNode) -> (Uuid, SharedGraph) {
        let id = Uuid::new_v4();
        let graph = SharedGraph::new(GraphSession::new(root));
        let now = Instant::now();

        let mut sessions = self.sessions.write();
        let expired = self.sweep(&mut sessions, now);
        if expired > 0 {
            info!(expired, "idle graph views dropped");
        }

        let mut owned: Vec<(Uuid, Instant)> = sessions
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(id, entry)| (*id, entry.last_used))
            .collect();
        if owned.len() >= self.max_per_owner {
            owned.sort_by_key(|(_, last_used)| *last_used);
            let excess = owned.len() + 1 - self.max_per_owner;
            for (evicted, _) in owned.into_iter().take(excess) {
                sessions.remove(&evicted);
                info!(session = %evicted, "graph view evicted");
            }
        }

        sessions.insert(
            id,
            Entry {
                owner: owner.to_string(),
                graph: graph.clone(),
                last_used: now,
            },
        );
        info!(session = %id, "graph view opened");
        (id, graph)
    }

    /// The view `id` if `owner` holds it; touching it restarts its idle clock
    pub fn get(&self, id: &Uuid, owner: &str) -> Result<SharedGraph> {
        let now = Instant::now();
        let not_found = || Error::SessionNotFound { id: id.to_string() };
        let mut sessions = self.sessions.write();

        let idle = match sessions.get(id) {
            Some(entry) if entry.owner == owner => self.is_idle(entry, now),
            _ => return Err(not_found()),
        };
        if idle {
            sessions.remove(id);
            info!(session = %id, "graph view expired");
            return Err(not_found());
        }

        let entry = sessions.get_mut(id).ok_or_else(not_found)?;
        entry.last_used = now;
        Ok(entry.graph.clone())
    }

    /// Discard a view; returns false when `owner` had no such view open
    pub fn close(&self, id: &Uuid, owner: &str) -> bool {
        let mut sessions = self.sessions.write();
        let owned = sessions.get(id).is_some_and(|entry| entry.owner == owner);
        if owned {
            sessions.remove(id);
            info!(session = %id, "graph view closed");
        }
        owned
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn is_idle(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_used) >= self.idle_ttl
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_idle(entry, now));
        before - sessions.len()
    }
}
