//! Pagination operator.

use crate::binding::Binding;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::iter::{BindingIter, BoxBindingIter};
use crate::plan::{PlanElement, PlanRef};

/// Skips `start` solutions and yields at most `length` thereafter.
///
/// Applied outermost so pagination counts final result rows, after
/// ordering, projection and deduplication. A negative `start` or `length`
/// means the corresponding side is unset.
#[derive(Debug)]
pub struct LimitOffset {
    input: Option<PlanRef>,
    start: i64,
    length: i64,
}

impl LimitOffset {
    /// Creates a pagination node over `input`.
    pub fn new(input: Option<PlanRef>, start: i64, length: i64) -> Self {
        LimitOffset {
            input,
            start,
            length,
        }
    }
}

impl PlanElement for LimitOffset {
    fn build(&self, input: BoxBindingIter, ctx: &ExecutionContext) -> Result<BoxBindingIter> {
        let upstream = match &self.input {
            Some(element) => element.build(input, ctx)?,
            None => input,
        };
        Ok(Box::new(LimitIter {
            input: upstream,
            offset: if self.start > 0 { self.start as u64 } else { 0 },
            limit: if self.length >= 0 {
                Some(self.length as u64)
            } else {
                None
            },
            skipped: 0,
            returned: 0,
            closed: false,
        }))
    }

    fn name(&self) -> &'static str {
        "LimitOffset"
    }

    fn input(&self) -> Option<&PlanRef> {
        self.input.as_ref()
    }
}

struct LimitIter {
    input: BoxBindingIter,
    offset: u64,
    limit: Option<u64>,
    skipped: u64,
    returned: u64,
    closed: bool,
}

impl BindingIter for LimitIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        if self.closed {
            return Ok(None);
        }
        if let Some(limit) = self.limit {
            if self.returned >= limit {
                return Ok(None);
            }
        }
        while let Some(binding) = self.input.try_next()? {
            if self.skipped < self.offset {
                self.skipped += 1;
                continue;
            }
            self.returned += 1;
            return Ok(Some(binding));
        }
        Ok(None)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.input.close();
        }
    }
}
