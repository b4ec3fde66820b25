//! Query engine orchestration.
//!
//! The engine owns one query for its lifetime: it derives the modifier
//! snapshot, builds the plan once (cached thereafter), seeds each execution
//! with the root binding, and drives the plan into a [`ResultIter`].

use std::sync::Arc;

use tracing::debug;

use crate::binding::{Binding, Var};
use crate::config::Context;
use crate::context::ExecutionContext;
use crate::dataset::DatasetGraph;
use crate::error::{EngineError, Result};
use crate::iter::{BoxBindingIter, CheckIter, EmptyIter, ResultIter, SingletonIter};
use crate::pattern::PatternCompiler;
use crate::plan::{build_plan, BuiltPlan, Modifiers, Plan, PlanHooks, PlanRef};
use crate::query::Query;
use crate::value::Value;

/// Plan-cache side of the engine lifecycle. Execution lifecycles live on
/// each [`ResultIter`], since executions are independent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EngineState {
    /// No plan has been built yet.
    Unbuilt,
    /// The plan is built and cached; further build requests return it
    /// unchanged.
    Planned,
}

/// Executes one query against one dataset.
///
/// Create directly or through an
/// [`EngineFactory`](crate::registry::EngineFactory). The plan is built
/// lazily on the first [`plan`](QueryEngine::plan) or
/// [`execute`](QueryEngine::execute) call and reused for every execution
/// after that.
pub struct QueryEngine {
    query: Query,
    context: Context,
    compiler: Arc<dyn PatternCompiler>,
    hooks: PlanHooks,
    dataset: Option<Arc<dyn DatasetGraph>>,
    initial: Option<Vec<(Var, Value)>>,
    built: Option<BuiltPlan>,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl QueryEngine {
    /// Creates an engine for `query` using the given configuration and
    /// pattern compiler.
    pub fn new(query: Query, context: Context, compiler: Arc<dyn PatternCompiler>) -> Self {
        QueryEngine {
            query,
            context,
            compiler,
            hooks: PlanHooks::default(),
            dataset: None,
            initial: None,
            built: None,
        }
    }

    /// Installs plan-construction hooks. Must be called before the first
    /// plan build to have any effect.
    pub fn with_hooks(mut self, hooks: PlanHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Attaches the dataset executions run against.
    pub fn set_dataset(&mut self, dataset: Arc<dyn DatasetGraph>) {
        self.dataset = Some(dataset);
    }

    /// Supplies a partial solution layered beneath every result binding.
    ///
    /// Even an empty solution counts as supplied: a patternless query then
    /// yields one (empty-extended) binding instead of none.
    pub fn set_initial<I>(&mut self, solution: I)
    where
        I: IntoIterator<Item = (Var, Value)>,
    {
        self.initial = Some(solution.into_iter().collect());
    }

    /// The query this engine executes.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The engine's configuration map.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Where the engine sits in its plan lifecycle.
    pub fn state(&self) -> EngineState {
        if self.built.is_some() {
            EngineState::Planned
        } else {
            EngineState::Unbuilt
        }
    }

    /// The plan for the whole query, building it on the first call.
    ///
    /// Repeated calls return the identical cached tree; the pattern
    /// compiler runs at most once per engine.
    pub fn plan(&mut self) -> Result<Plan> {
        let built = self.build_cached()?;
        Ok(Plan::new(built.root.clone()))
    }

    /// The plan subtree for the match pattern alone, building the whole
    /// plan if necessary.
    pub fn pattern_plan(&mut self) -> Result<Option<PlanRef>> {
        let built = self.build_cached()?;
        Ok(built.pattern.clone())
    }

    fn build_cached(&mut self) -> Result<&BuiltPlan> {
        if self.built.is_none() {
            let mods = Modifiers::from_query(&self.query);
            let built = build_plan(
                &self.context,
                self.compiler.as_ref(),
                &self.hooks,
                &self.query,
                &mods,
            )?;
            debug!(
                operators = Plan::new(built.root.clone()).chain().len(),
                "query plan built"
            );
            self.built = Some(built);
        }
        match &self.built {
            Some(built) => Ok(built),
            None => Err(EngineError::Internal("plan cache empty after build")),
        }
    }

    /// Wires the execution context to the dataset.
    ///
    /// Executing without a dataset attached is a programming-contract
    /// violation, not a query error.
    fn init(&self) -> Result<ExecutionContext> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or(EngineError::Internal("query execution not initialised"))?;
        Ok(ExecutionContext::new(
            self.context.clone(),
            dataset.default_graph(),
            Arc::clone(dataset),
        ))
    }

    /// Seed binding for one execution: the canonical root, with the
    /// caller-supplied partial solution layered on top when present.
    fn initial_binding(&self) -> Binding {
        let root = Binding::root();
        match &self.initial {
            Some(pairs) => root.extend(pairs.iter().cloned()),
            None => root,
        }
    }

    /// Executes the query, producing an independent result stream.
    ///
    /// Each call seeds a fresh binding chain and fresh operator state; the
    /// cached plan tree is shared. If anything fails after iterators have
    /// been opened, they are closed before the error propagates.
    pub fn execute(&mut self) -> Result<ResultIter> {
        self.build_cached()?;
        let exec_ctx = self.init()?;
        let seed = self.initial_binding();

        // No match clause: a supplied solution passes through as the single
        // result; otherwise the result set is empty. The two outcomes are
        // distinct.
        if self.query.pattern().is_none() {
            return if self.initial.is_some() {
                Ok(ResultIter::new(Box::new(SingletonIter::new(seed))))
            } else {
                Ok(ResultIter::new(Box::new(EmptyIter)))
            };
        }

        let root = match self.built.as_ref().and_then(|built| built.root.clone()) {
            Some(root) => root,
            None => {
                return Err(EngineError::Internal(
                    "pattern query built an empty plan",
                ))
            }
        };
        let input: BoxBindingIter = Box::new(SingletonIter::new(seed));
        // Build closes its upstream on failure, so an error here leaks
        // nothing.
        let iter = root.build(input, &exec_ctx)?;
        Ok(ResultIter::new(Box::new(CheckIter::new(iter))))
    }
}
