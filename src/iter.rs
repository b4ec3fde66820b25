//! Pull-based, closeable iteration over solution bindings.
//!
//! Every operator produces and consumes the same contract: a lazy sequence
//! of [`Binding`] values pulled one at a time, with an explicit `close` that
//! releases resources. Close must be idempotent, safe before exhaustion,
//! and must propagate to every still-open child in the operator tree.

use crate::binding::Binding;
use crate::error::{EngineError, Result};

/// Lazy, closeable stream of bindings.
pub trait BindingIter: Send {
    /// Pulls the next binding, `Ok(None)` on exhaustion.
    fn try_next(&mut self) -> Result<Option<Binding>>;

    /// Releases resources held by this iterator and every child.
    ///
    /// Safe to call repeatedly and safe to call before exhaustion; after a
    /// close, `try_next` returns `Ok(None)`.
    fn close(&mut self);
}

/// Boxed [`BindingIter`] for dynamic composition.
pub type BoxBindingIter = Box<dyn BindingIter>;

/// Lifecycle of one execution's result stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IterState {
    /// Producing bindings.
    Open,
    /// Exhausted normally.
    Finished,
    /// Closed, either after exhaustion, on error, or by the caller.
    Closed,
}

impl IterState {
    /// Whether the stream can still produce bindings.
    pub fn is_open(self) -> bool {
        matches!(self, IterState::Open)
    }

    /// Whether the stream ran to exhaustion.
    pub fn is_finished(self) -> bool {
        matches!(self, IterState::Finished)
    }

    /// Whether the stream has been closed.
    pub fn is_closed(self) -> bool {
        matches!(self, IterState::Closed)
    }
}

/// Yields exactly one binding.
pub struct SingletonIter {
    binding: Option<Binding>,
    closed: bool,
}

impl SingletonIter {
    /// Creates an iterator over the single given binding.
    pub fn new(binding: Binding) -> Self {
        SingletonIter {
            binding: Some(binding),
            closed: false,
        }
    }
}

impl BindingIter for SingletonIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.binding.take())
    }

    fn close(&mut self) {
        self.closed = true;
        self.binding = None;
    }
}

/// Yields nothing.
pub struct EmptyIter;

impl BindingIter for EmptyIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        Ok(None)
    }

    fn close(&mut self) {}
}

/// Validation stage enforcing structural invariants on emitted bindings.
///
/// Wraps the root of a built plan; a binding that rebinds a variable to a
/// conflicting value along its chain is a defect in some operator and
/// surfaces as an internal error.
pub struct CheckIter {
    input: BoxBindingIter,
    closed: bool,
}

impl CheckIter {
    /// Wraps the given stream.
    pub fn new(input: BoxBindingIter) -> Self {
        CheckIter {
            input,
            closed: false,
        }
    }
}

impl BindingIter for CheckIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        if self.closed {
            return Ok(None);
        }
        match self.input.try_next()? {
            Some(binding) => {
                if !binding.is_well_formed() {
                    return Err(EngineError::Internal(
                        "emitted binding rebinds a variable to a conflicting value",
                    ));
                }
                Ok(Some(binding))
            }
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

/// Result stream handed to the caller of [`QueryEngine::execute`].
///
/// Pull bindings with [`Iterator::next`] or [`ResultIter::try_next`]; an
/// error closes the whole operator tree before it is returned, and dropping
/// the stream early closes it as well. Closing after exhaustion is a no-op.
///
/// [`QueryEngine::execute`]: crate::engine::QueryEngine::execute
pub struct ResultIter {
    input: BoxBindingIter,
    state: IterState,
}

impl ResultIter {
    pub(crate) fn new(input: BoxBindingIter) -> Self {
        ResultIter {
            input,
            state: IterState::Open,
        }
    }

    /// The stream's lifecycle state.
    pub fn state(&self) -> IterState {
        self.state
    }

    /// Pulls the next binding, closing the tree if the pull fails.
    pub fn try_next(&mut self) -> Result<Option<Binding>> {
        if !self.state.is_open() {
            return Ok(None);
        }
        match self.input.try_next() {
            Ok(Some(binding)) => Ok(Some(binding)),
            Ok(None) => {
                self.input.close();
                self.state = IterState::Finished;
                Ok(None)
            }
            Err(err) => {
                self.input.close();
                self.state = IterState::Closed;
                Err(err)
            }
        }
    }

    /// Abandons the stream, releasing all resources in the operator tree.
    pub fn close(&mut self) {
        if !self.state.is_closed() {
            self.input.close();
            self.state = IterState::Closed;
        }
    }
}

impl std::fmt::Debug for ResultIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultIter")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Iterator for ResultIter {
    type Item = Result<Binding>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}

impl Drop for ResultIter {
    fn drop(&mut self) {
        self.close();
    }
}
