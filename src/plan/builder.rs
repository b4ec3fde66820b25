//! Plan construction around the compiled pattern subtree.
//!
//! The wrapping order is fixed and semantically required: OrderBy must see
//! every pattern variable, including ones later projected away, so it sits
//! below Project; Distinct operates on the post-projection result shape, so
//! it sits above Project; LimitOffset paginates the final stream, so it is
//! outermost.

use std::sync::Arc;

use tracing::warn;

use crate::binding::Var;
use crate::config::{Context, AUTO_DISTINCT};
use crate::error::Result;
use crate::pattern::PatternCompiler;
use crate::plan::{Distinct, LimitOffset, OrderBy, PlanRef, Project};
use crate::query::{OrderCondition, Query, ResultShape};

/// Solution-modifier snapshot derived from a query, built once per plan
/// build.
#[derive(Clone, Debug)]
pub struct Modifiers {
    /// Pagination offset, negative when unset.
    pub start: i64,
    /// Pagination limit, negative when unset.
    pub length: i64,
    /// Whether duplicate elimination applies.
    pub distinct: bool,
    /// Projection variables; `None` exposes every bound variable and
    /// suppresses the Project operator.
    pub project_vars: Option<Vec<Var>>,
    /// Order conditions in priority order.
    pub order_conditions: Vec<OrderCondition>,
}

impl Modifiers {
    /// Derives the snapshot from a query.
    ///
    /// Construct-shaped queries force `project_vars` to `None`: the
    /// downstream consumer needs every bound variable to instantiate its
    /// template.
    pub fn from_query(query: &Query) -> Self {
        let project_vars = if query.shape() == ResultShape::Construct {
            None
        } else {
            Some(query.result_vars().to_vec())
        };
        Modifiers {
            start: query.offset(),
            length: query.limit(),
            distinct: query.is_distinct(),
            project_vars,
            order_conditions: query.order_conditions().to_vec(),
        }
    }
}

/// Strategy function inspecting (and possibly replacing) a plan subtree.
pub type HookFn = Arc<dyn Fn(&Context, Option<PlanRef>) -> Result<Option<PlanRef>> + Send + Sync>;

/// Extension points around plan construction.
///
/// `pattern` runs over the base subtree before any modifier wrapping;
/// `plan` runs over the fully wrapped root. Both default to identity.
#[derive(Clone, Default)]
pub struct PlanHooks {
    /// Hook over the compiled pattern subtree.
    pub pattern: Option<HookFn>,
    /// Hook over the fully wrapped plan root.
    pub plan: Option<HookFn>,
}

impl PlanHooks {
    fn apply(hook: &Option<HookFn>, context: &Context, element: Option<PlanRef>) -> Result<Option<PlanRef>> {
        match hook {
            Some(hook) => hook(context, element),
            None => Ok(element),
        }
    }
}

/// Output of [`build_plan`]: the wrapped root plus the pattern-only
/// subtree, kept separately for callers that want to inspect it.
#[derive(Clone, Debug)]
pub struct BuiltPlan {
    /// Root of the fully wrapped plan; absent for queries with neither a
    /// pattern nor any modifier.
    pub root: Option<PlanRef>,
    /// The base subtree produced for the match pattern, after the pattern
    /// hook.
    pub pattern: Option<PlanRef>,
}

/// Wraps the compiled pattern subtree with modifier operators.
///
/// The chain, innermost first, is always
/// pattern → OrderBy → Project → Distinct → LimitOffset, with each
/// operator present only when its modifier applies.
pub fn build_plan(
    context: &Context,
    compiler: &dyn PatternCompiler,
    hooks: &PlanHooks,
    query: &Query,
    mods: &Modifiers,
) -> Result<BuiltPlan> {
    // An absent pattern compiles to an absent subtree; the compiler is not
    // consulted.
    let base = match query.pattern() {
        Some(pattern) => Some(compiler.compile(context, pattern)?),
        None => None,
    };
    let pattern_plan = PlanHooks::apply(&hooks.pattern, context, base)?;
    let mut root = pattern_plan.clone();

    if !mods.order_conditions.is_empty() {
        root = Some(Arc::new(OrderBy::new(root, mods.order_conditions.clone())));
    }

    if let Some(vars) = &mods.project_vars {
        if !query.is_select_all() {
            if vars.is_empty() && query.shape() == ResultShape::Rows {
                warn!("query selects no projection variables");
            }
            if !vars.is_empty() {
                root = Some(Arc::new(Project::new(root, vars.clone())));
            }
        }
    }

    if mods.distinct || context.is_true(AUTO_DISTINCT) {
        root = Some(Arc::new(Distinct::new(root, mods.project_vars.clone())));
    }

    if query.has_limit() || query.has_offset() {
        root = Some(Arc::new(LimitOffset::new(root, mods.start, mods.length)));
    }

    let root = PlanHooks::apply(&hooks.plan, context, root)?;
    Ok(BuiltPlan {
        root,
        pattern: pattern_plan,
    })
}
