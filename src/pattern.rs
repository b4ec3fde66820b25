//! Pattern element structure and the external compiler contract.
//!
//! The engine never evaluates patterns itself: a [`PatternCompiler`] turns a
//! [`PatternElement`] into the base operator subtree the plan builder wraps
//! with modifier operators.

use crate::binding::Var;
use crate::config::Context;
use crate::error::Result;
use crate::plan::PlanRef;
use crate::value::Value;

/// One position of a triple constraint: a variable or a fixed value.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// Variable bound during matching.
    Var(Var),
    /// Fixed value the stored term must equal.
    Value(Value),
}

impl From<Var> for Term {
    fn from(var: Var) -> Self {
        Term::Var(var)
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::Value(value)
    }
}

/// Single edge constraint over the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct TriplePattern {
    /// Source position.
    pub subject: Term,
    /// Edge position.
    pub predicate: Term,
    /// Target position.
    pub object: Term,
}

impl TriplePattern {
    /// Creates a triple constraint.
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Term>, object: impl Into<Term>) -> Self {
        TriplePattern {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// Match clause of a query.
#[derive(Clone, Debug, PartialEq)]
pub enum PatternElement {
    /// Conjunction of triple constraints matched together.
    Basic(Vec<TriplePattern>),
    /// Sequence of sub-patterns evaluated in order.
    Group(Vec<PatternElement>),
}

/// Compiles a pattern element into a base operator subtree.
///
/// Implementations must be deterministic: the same pattern and configuration
/// produce an equivalent subtree. A malformed pattern is a query-level
/// error, never an internal one.
pub trait PatternCompiler: Send + Sync {
    /// Produces the base (pre-modifier) plan subtree for `pattern`.
    fn compile(&self, context: &Context, pattern: &PatternElement) -> Result<PlanRef>;
}
