//! Dataset and graph collaborator handles.
//!
//! Storage access is out of scope for this crate; the engine only threads
//! these opaque handles through the execution context so pattern-matching
//! operators produced by an external compiler can reach their store.

use std::fmt;
use std::sync::Arc;

/// Opaque handle to one graph inside a dataset.
pub trait Graph: fmt::Debug + Send + Sync {}

/// Handle to a dataset exposing its default graph.
pub trait DatasetGraph: fmt::Debug + Send + Sync {
    /// The graph queries run against when no other graph is named.
    fn default_graph(&self) -> Arc<dyn Graph>;
}

/// Trivial in-memory graph handle for tests and prototyping.
#[derive(Debug, Default)]
pub struct MemoryGraph;

impl Graph for MemoryGraph {}

/// Trivial in-memory dataset wrapping a single [`MemoryGraph`].
#[derive(Debug)]
pub struct MemoryDataset {
    default_graph: Arc<dyn Graph>,
}

impl MemoryDataset {
    /// Creates a dataset with one empty default graph.
    pub fn new() -> Self {
        MemoryDataset {
            default_graph: Arc::new(MemoryGraph),
        }
    }
}

impl Default for MemoryDataset {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetGraph for MemoryDataset {
    fn default_graph(&self) -> Arc<dyn Graph> {
        Arc::clone(&self.default_graph)
    }
}
