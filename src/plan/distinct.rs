//! Duplicate elimination operator.

use rustc_hash::FxHashSet;

use crate::binding::{Binding, Var};
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::iter::{BindingIter, BoxBindingIter};
use crate::plan::{PlanElement, PlanRef};
use crate::value::ValueKey;

/// Eliminates duplicate solutions over the exposed variable set.
///
/// Sits above any projection so deduplication sees the true result shape.
/// The seen-set grows for the lifetime of the output stream; first-seen
/// order is preserved.
#[derive(Debug)]
pub struct Distinct {
    input: Option<PlanRef>,
    key_vars: Option<Vec<Var>>,
}

impl Distinct {
    /// Creates a dedup node over `input`.
    ///
    /// `key_vars` is the projection hint: when present, only those
    /// variables contribute to the dedup key; when absent, every visible
    /// variable does.
    pub fn new(input: Option<PlanRef>, key_vars: Option<Vec<Var>>) -> Self {
        Distinct { input, key_vars }
    }
}

impl PlanElement for Distinct {
    fn build(&self, input: BoxBindingIter, ctx: &ExecutionContext) -> Result<BoxBindingIter> {
        let upstream = match &self.input {
            Some(element) => element.build(input, ctx)?,
            None => input,
        };
        Ok(Box::new(DistinctIter {
            input: upstream,
            key_vars: self.key_vars.clone(),
            seen: FxHashSet::default(),
            closed: false,
        }))
    }

    fn name(&self) -> &'static str {
        "Distinct"
    }

    fn input(&self) -> Option<&PlanRef> {
        self.input.as_ref()
    }
}

struct DistinctIter {
    input: BoxBindingIter,
    key_vars: Option<Vec<Var>>,
    seen: FxHashSet<Vec<(Var, ValueKey)>>,
    closed: bool,
}

fn dedup_key(binding: &Binding, hint: Option<&[Var]>) -> Vec<(Var, ValueKey)> {
    match hint {
        Some(vars) => vars
            .iter()
            .filter_map(|var| {
                binding
                    .get(var)
                    .map(|value| (var.clone(), ValueKey::from(value)))
            })
            .collect(),
        None => {
            let mut pairs: Vec<(Var, ValueKey)> = binding
                .entries()
                .into_iter()
                .map(|(var, value)| (var.clone(), ValueKey::from(value)))
                .collect();
            pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
            pairs
        }
    }
}

impl BindingIter for DistinctIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        if self.closed {
            return Ok(None);
        }
        while let Some(binding) = self.input.try_next()? {
            let key = dedup_key(&binding, self.key_vars.as_deref());
            if self.seen.insert(key) {
                return Ok(Some(binding));
            }
        }
        Ok(None)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.seen = FxHashSet::default();
            self.input.close();
        }
    }
}
