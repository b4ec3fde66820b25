//! Projection operator.

use crate::binding::{Binding, Var};
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::iter::{BindingIter, BoxBindingIter};
use crate::plan::{PlanElement, PlanRef};

/// Restricts every solution to the declared result variables.
///
/// Streaming: each binding is mapped independently. Never inserted for
/// select-all or construct-shaped queries, so the full binding set stays
/// visible there.
#[derive(Debug)]
pub struct Project {
    input: Option<PlanRef>,
    vars: Vec<Var>,
}

impl Project {
    /// Creates a projection node over `input`.
    pub fn new(input: Option<PlanRef>, vars: Vec<Var>) -> Self {
        Project { input, vars }
    }

    /// The variables the output is restricted to.
    pub fn vars(&self) -> &[Var] {
        &self.vars
    }
}

impl PlanElement for Project {
    fn build(&self, input: BoxBindingIter, ctx: &ExecutionContext) -> Result<BoxBindingIter> {
        let upstream = match &self.input {
            Some(element) => element.build(input, ctx)?,
            None => input,
        };
        Ok(Box::new(ProjectIter {
            input: upstream,
            vars: self.vars.clone(),
            closed: false,
        }))
    }

    fn name(&self) -> &'static str {
        "Project"
    }

    fn input(&self) -> Option<&PlanRef> {
        self.input.as_ref()
    }
}

struct ProjectIter {
    input: BoxBindingIter,
    vars: Vec<Var>,
    closed: bool,
}

impl BindingIter for ProjectIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        if self.closed {
            return Ok(None);
        }
        match self.input.try_next()? {
            Some(binding) => Ok(Some(binding.project(&self.vars))),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.input.close();
        }
    }
}
