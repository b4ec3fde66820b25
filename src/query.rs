//! Query structure consumed by the engine.
//!
//! A [`Query`] is produced externally (by a parser or a programmatic
//! builder) and is read-only for the engine's lifetime. It carries the
//! pattern to match plus the solution modifiers: ordering, projection,
//! deduplication and pagination.

use crate::binding::Var;
use crate::pattern::PatternElement;
use crate::value::Value;

/// Sentinel meaning "offset/limit not set".
pub const UNSET: i64 = -1;

/// Shape of the result the downstream consumer expects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultShape {
    /// A set of solution rows.
    Rows,
    /// Solutions feed a construct template; every bound variable must stay
    /// visible.
    Construct,
    /// A yes/no answer.
    Ask,
    /// A description of matched resources.
    Describe,
}

/// Sort direction of one order condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Expression evaluated against a solution to produce a sort key.
#[derive(Clone, Debug, PartialEq)]
pub enum SortExpr {
    /// The value bound to a variable; unbound sorts before every value.
    Var(Var),
    /// A fixed value, identical for every solution.
    Constant(Value),
}

/// One ORDER BY condition.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderCondition {
    /// Expression producing the sort key.
    pub expr: SortExpr,
    /// Direction the keys are ordered in.
    pub direction: SortDirection,
}

impl OrderCondition {
    /// Ascending order over a variable.
    pub fn asc(var: impl Into<Var>) -> Self {
        OrderCondition {
            expr: SortExpr::Var(var.into()),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending order over a variable.
    pub fn desc(var: impl Into<Var>) -> Self {
        OrderCondition {
            expr: SortExpr::Var(var.into()),
            direction: SortDirection::Descending,
        }
    }
}

/// Parsed query handed to the engine.
///
/// Constructed fluently:
///
/// ```
/// use tiniebla::query::{Query, ResultShape, OrderCondition};
///
/// let query = Query::new(ResultShape::Rows)
///     .with_result_vars(["name"])
///     .with_order(OrderCondition::asc("name"))
///     .with_limit(10);
/// assert!(query.has_limit());
/// ```
#[derive(Clone, Debug)]
pub struct Query {
    pattern: Option<PatternElement>,
    result_vars: Vec<Var>,
    offset: i64,
    limit: i64,
    distinct: bool,
    order: Vec<OrderCondition>,
    shape: ResultShape,
    select_all: bool,
}

impl Query {
    /// Creates an empty query of the given result shape.
    pub fn new(shape: ResultShape) -> Self {
        Query {
            pattern: None,
            result_vars: Vec::new(),
            offset: UNSET,
            limit: UNSET,
            distinct: false,
            order: Vec::new(),
            shape,
            select_all: false,
        }
    }

    /// Sets the match pattern.
    pub fn with_pattern(mut self, pattern: PatternElement) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Appends result variables in order.
    pub fn with_result_vars<I, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Var>,
    {
        self.result_vars.extend(vars.into_iter().map(Into::into));
        self
    }

    /// Sets the pagination offset. Negative values mean unset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the pagination limit. Negative values mean unset.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Requests duplicate elimination.
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Appends an order condition.
    pub fn with_order(mut self, condition: OrderCondition) -> Self {
        self.order.push(condition);
        self
    }

    /// Marks the projection as unconstrained ("select every bound
    /// variable").
    pub fn with_select_all(mut self, select_all: bool) -> Self {
        self.select_all = select_all;
        self
    }

    /// The match pattern, if the query has one.
    pub fn pattern(&self) -> Option<&PatternElement> {
        self.pattern.as_ref()
    }

    /// The declared result variables, in order.
    pub fn result_vars(&self) -> &[Var] {
        &self.result_vars
    }

    /// Raw offset value, [`UNSET`] when absent.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Raw limit value, [`UNSET`] when absent.
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Whether an offset was set.
    pub fn has_offset(&self) -> bool {
        self.offset >= 0
    }

    /// Whether a limit was set.
    pub fn has_limit(&self) -> bool {
        self.limit >= 0
    }

    /// Whether duplicate elimination was requested.
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// The order conditions, in order of priority.
    pub fn order_conditions(&self) -> &[OrderCondition] {
        &self.order
    }

    /// The result shape tag.
    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Whether the projection is unconstrained.
    pub fn is_select_all(&self) -> bool {
        self.select_all
    }
}
