//! Sort operator.

use std::cmp::Ordering;

use crate::binding::Binding;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::iter::{BindingIter, BoxBindingIter};
use crate::plan::{PlanElement, PlanRef};
use crate::query::{OrderCondition, SortDirection, SortExpr};
use crate::value::{self, Value};

/// Orders the upstream stream by a list of conditions.
///
/// Sits below any projection so conditions may reference variables that are
/// later projected away. Blocking: the whole upstream sequence is buffered
/// and sorted before the first result is emitted.
#[derive(Debug)]
pub struct OrderBy {
    input: Option<PlanRef>,
    conditions: Vec<OrderCondition>,
}

impl OrderBy {
    /// Creates a sort node over `input`.
    pub fn new(input: Option<PlanRef>, conditions: Vec<OrderCondition>) -> Self {
        OrderBy { input, conditions }
    }
}

impl PlanElement for OrderBy {
    fn build(&self, input: BoxBindingIter, ctx: &ExecutionContext) -> Result<BoxBindingIter> {
        let upstream = match &self.input {
            Some(element) => element.build(input, ctx)?,
            None => input,
        };
        Ok(Box::new(OrderIter {
            input: upstream,
            conditions: self.conditions.clone(),
            buffered: None,
            closed: false,
        }))
    }

    fn name(&self) -> &'static str {
        "OrderBy"
    }

    fn input(&self) -> Option<&PlanRef> {
        self.input.as_ref()
    }
}

struct OrderIter {
    input: BoxBindingIter,
    conditions: Vec<OrderCondition>,
    buffered: Option<std::vec::IntoIter<Binding>>,
    closed: bool,
}

impl BindingIter for OrderIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        if self.closed {
            return Ok(None);
        }
        if self.buffered.is_none() {
            let mut rows = Vec::new();
            while let Some(binding) = self.input.try_next()? {
                rows.push(binding);
            }
            let conditions = &self.conditions;
            rows.sort_by(|a, b| compare_bindings(a, b, conditions));
            self.buffered = Some(rows.into_iter());
        }
        Ok(self.buffered.as_mut().and_then(Iterator::next))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.buffered = None;
            self.input.close();
        }
    }
}

fn sort_key<'a>(expr: &'a SortExpr, binding: &'a Binding) -> Option<&'a Value> {
    match expr {
        SortExpr::Var(var) => binding.get(var),
        SortExpr::Constant(value) => Some(value),
    }
}

fn compare_bindings(a: &Binding, b: &Binding, conditions: &[OrderCondition]) -> Ordering {
    for condition in conditions {
        // Unbound sorts before every bound value.
        let cmp = match (sort_key(&condition.expr, a), sort_key(&condition.expr, b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(left), Some(right)) => value::compare(left, right),
        };
        let cmp = match condition.direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}
