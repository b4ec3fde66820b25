//! Physical plan tree and the modifier-wrapping builder.

/// Plan construction around the compiled pattern subtree.
pub mod builder;

/// Duplicate elimination operator.
pub mod distinct;

/// Pagination operator.
pub mod limit;

/// Sort operator.
pub mod order;

/// Projection operator.
pub mod project;

/// Fixed-rows pattern source for tests and prototyping.
pub mod seed;

use std::fmt;
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::iter::BoxBindingIter;

pub use builder::{build_plan, BuiltPlan, HookFn, Modifiers, PlanHooks};
pub use distinct::Distinct;
pub use limit::LimitOffset;
pub use order::OrderBy;
pub use project::Project;
pub use seed::StaticBindings;

/// Node in the physical plan tree.
///
/// A plan element's only capability is `build`: turn the upstream binding
/// stream into this node's output stream. Elements are immutable once
/// built and may be executed any number of times; each build produces an
/// iterator private to that execution.
pub trait PlanElement: fmt::Debug + Send + Sync {
    /// Builds this node's output stream over `input`.
    ///
    /// On failure the implementation must close `input` (or whatever
    /// iterator it derived from it) before returning, so no iterator leaks
    /// along the abort path.
    fn build(&self, input: BoxBindingIter, ctx: &ExecutionContext) -> Result<BoxBindingIter>;

    /// Name of this operator kind, used in explain output.
    fn name(&self) -> &'static str;

    /// The wrapped upstream element, if this node has one.
    fn input(&self) -> Option<&PlanRef> {
        None
    }
}

/// Shared handle to a plan element.
pub type PlanRef = Arc<dyn PlanElement>;

/// Executable handle over a built plan tree.
///
/// The root is absent for queries with no match clause and no modifiers.
#[derive(Clone, Debug)]
pub struct Plan {
    root: Option<PlanRef>,
}

impl Plan {
    pub(crate) fn new(root: Option<PlanRef>) -> Self {
        Plan { root }
    }

    /// The root plan element, if any.
    pub fn root(&self) -> Option<&PlanRef> {
        self.root.as_ref()
    }

    /// Operator names from the root down to the base subtree.
    pub fn chain(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut current = self.root.as_ref();
        while let Some(element) = current {
            names.push(element.name());
            current = element.input();
        }
        names
    }
}
