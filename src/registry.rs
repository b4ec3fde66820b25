//! Engine factory dispatch.
//!
//! A registry holds an ordered collection of factories; the first factory
//! accepting a query/dataset pair creates the engine for it. The registry
//! is the one piece of mutable shared state in the crate and is expected to
//! change only at process start and stop, never while a query is in flight.

use std::sync::Arc;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::config::Context;
use crate::dataset::DatasetGraph;
use crate::engine::QueryEngine;
use crate::error::{EngineError, Result};
use crate::pattern::PatternCompiler;
use crate::query::Query;

/// Creates engines for the queries it accepts.
pub trait EngineFactory: Send + Sync {
    /// Whether this factory handles the given query/dataset pair.
    fn accept(&self, query: &Query, dataset: &Arc<dyn DatasetGraph>) -> bool;

    /// Creates an engine for the pair. Only called after `accept` returned
    /// true.
    fn create(&self, query: Query, dataset: Arc<dyn DatasetGraph>) -> QueryEngine;
}

/// Catch-all factory accepting every query.
///
/// Register it before any specialised factory so it is consulted last.
pub struct DefaultEngineFactory {
    context: Context,
    compiler: Arc<dyn PatternCompiler>,
}

impl DefaultEngineFactory {
    /// Creates the catch-all factory around a pattern compiler and the
    /// configuration its engines start from.
    pub fn new(context: Context, compiler: Arc<dyn PatternCompiler>) -> Self {
        DefaultEngineFactory { context, compiler }
    }
}

impl EngineFactory for DefaultEngineFactory {
    fn accept(&self, _query: &Query, _dataset: &Arc<dyn DatasetGraph>) -> bool {
        true
    }

    fn create(&self, query: Query, dataset: Arc<dyn DatasetGraph>) -> QueryEngine {
        let mut engine = QueryEngine::new(query, self.context.clone(), Arc::clone(&self.compiler));
        engine.set_dataset(dataset);
        engine
    }
}

/// Ordered collection of engine factories.
///
/// Registration order matters: the most recently registered factory is
/// consulted first, so a catch-all belongs at the bottom (registered
/// first). Factories are identified by pointer, and both `register` and
/// `unregister` are idempotent.
#[derive(Default)]
pub struct EngineRegistry {
    factories: Vec<Arc<dyn EngineFactory>>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory at the front of the consultation order.
    ///
    /// Registering an already-registered factory is a no-op.
    pub fn register(&mut self, factory: Arc<dyn EngineFactory>) {
        if self.factories.iter().any(|f| Arc::ptr_eq(f, &factory)) {
            return;
        }
        self.factories.insert(0, factory);
    }

    /// Removes a factory. Unregistering an absent factory is a no-op.
    pub fn unregister(&mut self, factory: &Arc<dyn EngineFactory>) {
        self.factories.retain(|f| !Arc::ptr_eq(f, factory));
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no factory is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// The first factory accepting the pair, in consultation order.
    pub fn find(
        &self,
        query: &Query,
        dataset: &Arc<dyn DatasetGraph>,
    ) -> Option<Arc<dyn EngineFactory>> {
        self.factories
            .iter()
            .find(|factory| factory.accept(query, dataset))
            .cloned()
    }

    /// Dispatches to the first accepting factory and creates the engine.
    pub fn create(&self, query: Query, dataset: Arc<dyn DatasetGraph>) -> Result<QueryEngine> {
        match self.find(&query, &dataset) {
            Some(factory) => Ok(factory.create(query, dataset)),
            None => Err(EngineError::Query(
                "no engine factory accepts the query".into(),
            )),
        }
    }
}

static GLOBAL: OnceLock<RwLock<EngineRegistry>> = OnceLock::new();

/// The process-wide registry.
///
/// This is the single sanctioned global: it starts empty, hosts seed it
/// during startup (catch-all first), and mutations after startup are not
/// expected. All access goes through the lock.
pub fn global() -> &'static RwLock<EngineRegistry> {
    GLOBAL.get_or_init(|| RwLock::new(EngineRegistry::new()))
}

/// Registers a factory with the process-wide registry.
pub fn register(factory: Arc<dyn EngineFactory>) {
    global().write().register(factory);
}

/// Unregisters a factory from the process-wide registry.
pub fn unregister(factory: &Arc<dyn EngineFactory>) {
    global().write().unregister(factory);
}
