//! Per-execution context bundle.

use std::sync::Arc;

use crate::config::Context;
use crate::dataset::{DatasetGraph, Graph};

/// Read-only bundle of configuration, active graph, and dataset handle.
///
/// Built once per execution and threaded unchanged through every operator's
/// build step; safely shared because nothing in it is mutable.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    context: Context,
    active_graph: Arc<dyn Graph>,
    dataset: Arc<dyn DatasetGraph>,
}

impl ExecutionContext {
    /// Creates an execution context over the given collaborators.
    pub fn new(context: Context, active_graph: Arc<dyn Graph>, dataset: Arc<dyn DatasetGraph>) -> Self {
        ExecutionContext {
            context,
            active_graph,
            dataset,
        }
    }

    /// The configuration map.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The graph the execution currently matches against.
    pub fn active_graph(&self) -> &Arc<dyn Graph> {
        &self.active_graph
    }

    /// The full dataset handle.
    pub fn dataset(&self) -> &Arc<dyn DatasetGraph> {
        &self.dataset
    }
}
