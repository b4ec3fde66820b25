//! Fixed-rows pattern source.
//!
//! Extends every upstream binding with a configured list of rows, the way a
//! pattern-match subtree would extend the seed binding with solutions. Used
//! by tests and by embedders prototyping without a storage engine.

use crate::binding::{Binding, Var};
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::iter::{BindingIter, BoxBindingIter};
use crate::plan::PlanElement;
use crate::value::Value;

/// Pattern source producing a fixed list of rows per upstream binding.
#[derive(Clone, Debug, Default)]
pub struct StaticBindings {
    rows: Vec<Vec<(Var, Value)>>,
}

impl StaticBindings {
    /// Creates a source over the given rows.
    pub fn new(rows: Vec<Vec<(Var, Value)>>) -> Self {
        StaticBindings { rows }
    }

    /// Convenience: one variable, one row per value.
    pub fn column(var: impl Into<Var>, values: Vec<Value>) -> Self {
        let var = var.into();
        StaticBindings {
            rows: values
                .into_iter()
                .map(|value| vec![(var.clone(), value)])
                .collect(),
        }
    }
}

impl PlanElement for StaticBindings {
    fn build(&self, input: BoxBindingIter, _ctx: &ExecutionContext) -> Result<BoxBindingIter> {
        Ok(Box::new(StaticBindingsIter {
            input,
            rows: self.rows.clone(),
            current: None,
            index: 0,
            closed: false,
        }))
    }

    fn name(&self) -> &'static str {
        "StaticBindings"
    }
}

struct StaticBindingsIter {
    input: BoxBindingIter,
    rows: Vec<Vec<(Var, Value)>>,
    current: Option<Binding>,
    index: usize,
    closed: bool,
}

impl BindingIter for StaticBindingsIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        loop {
            if self.closed {
                return Ok(None);
            }
            if let Some(parent) = &self.current {
                if self.index < self.rows.len() {
                    let row = self.rows[self.index].clone();
                    self.index += 1;
                    return Ok(Some(parent.extend(row)));
                }
                self.current = None;
            }
            match self.input.try_next()? {
                Some(binding) => {
                    self.current = Some(binding);
                    self.index = 0;
                }
                None => return Ok(None),
            }
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.current = None;
            self.input.close();
        }
    }
}
