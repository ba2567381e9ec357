use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::SnapshotStore;
use crate::graph::MatchGraph;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub store: Arc<dyn SnapshotStore>,
}

/// Inner state that can be modified.
///
/// Handlers that mutate hold the write lock until their snapshot is saved,
/// so one request at a time drives the graph.
pub struct AppStateInner {
    pub graph: MatchGraph,
}

impl AppState {
    /// Wraps an ingested graph and the snapshot store it persists to
    pub fn new(graph: MatchGraph, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner { graph })),
            store,
        }
    }
}
