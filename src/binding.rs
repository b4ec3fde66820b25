//! Immutable variable-to-value bindings with parent chaining.
//!
//! A [`Binding`] is the unit of a query solution: a persistent mapping from
//! variables to values. Extending a binding layers a new frame on top of the
//! parent without mutating it, so one parent can be shared by many children
//! within a single execution. The canonical empty root binding is the
//! ancestor of every binding an execution produces.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::value::Value;

/// Identifier assigned to a variable within a query.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(pub String);

impl Var {
    /// Creates a variable from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Var(name.into())
    }

    /// The variable's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "?{}", self.0)
    }
}

impl From<&str> for Var {
    fn from(name: &str) -> Self {
        Var(name.to_owned())
    }
}

impl From<String> for Var {
    fn from(name: String) -> Self {
        Var(name)
    }
}

#[derive(Debug)]
struct Frame {
    parent: Binding,
    entries: SmallVec<[(Var, Value); 4]>,
}

/// Immutable solution mapping with an ownership-preserving parent link.
///
/// Cloning is cheap: frames are reference-counted and shared structurally.
/// The root binding carries no frame and never holds any pairs.
#[derive(Clone, Debug, Default)]
pub struct Binding {
    frame: Option<Arc<Frame>>,
}

impl Binding {
    /// The canonical empty root binding.
    pub fn root() -> Self {
        Binding { frame: None }
    }

    /// Whether this is the root sentinel (no frame at all).
    pub fn is_root(&self) -> bool {
        self.frame.is_none()
    }

    /// Layers a new frame with the given pairs on top of this binding.
    ///
    /// The receiver is untouched and remains valid for any other children
    /// already derived from it.
    pub fn extend<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (Var, Value)>,
    {
        let entries: SmallVec<[(Var, Value); 4]> = entries.into_iter().collect();
        Binding {
            frame: Some(Arc::new(Frame {
                parent: self.clone(),
                entries,
            })),
        }
    }

    /// Layers a single-pair frame on top of this binding.
    pub fn bind(&self, var: Var, value: Value) -> Self {
        self.extend([(var, value)])
    }

    /// Looks up a variable, innermost frame first.
    pub fn get(&self, var: &Var) -> Option<&Value> {
        let mut current = self;
        while let Some(frame) = current.frame.as_deref() {
            if let Some((_, value)) = frame.entries.iter().find(|(name, _)| name == var) {
                return Some(value);
            }
            current = &frame.parent;
        }
        None
    }

    /// Whether the variable is bound anywhere along the chain.
    pub fn contains(&self, var: &Var) -> bool {
        self.get(var).is_some()
    }

    /// Visible (variable, value) pairs, innermost occurrence winning.
    pub fn entries(&self) -> Vec<(&Var, &Value)> {
        let mut seen: Vec<(&Var, &Value)> = Vec::new();
        let mut current = self;
        while let Some(frame) = current.frame.as_deref() {
            for (var, value) in &frame.entries {
                if !seen.iter().any(|(name, _)| *name == var) {
                    seen.push((var, value));
                }
            }
            current = &frame.parent;
        }
        seen
    }

    /// Visible variables, innermost occurrence first.
    pub fn vars(&self) -> Vec<&Var> {
        self.entries().into_iter().map(|(var, _)| var).collect()
    }

    /// Number of visible variables.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Restricts the binding to the given variables.
    ///
    /// Produces a fresh single frame over the root; unbound variables are
    /// simply absent from the result.
    pub fn project(&self, vars: &[Var]) -> Binding {
        Binding::root().extend(
            vars.iter()
                .filter_map(|var| self.get(var).map(|value| (var.clone(), value.clone()))),
        )
    }

    /// Whether no variable is bound to conflicting values along the chain.
    ///
    /// Rebinding a variable to the same value in a deeper frame is fine;
    /// rebinding it to a different value marks a malformed solution.
    pub fn is_well_formed(&self) -> bool {
        let mut seen: Vec<(&Var, &Value)> = Vec::new();
        let mut current = self;
        while let Some(frame) = current.frame.as_deref() {
            for (var, value) in &frame.entries {
                match seen.iter().find(|(name, _)| *name == var) {
                    Some((_, earlier)) if *earlier != value => return false,
                    Some(_) => {}
                    None => seen.push((var, value)),
                }
            }
            current = &frame.parent;
        }
        true
    }

    /// Owned copy of the visible pairs, sorted by variable name.
    pub fn snapshot(&self) -> Vec<(Var, Value)> {
        let mut pairs: Vec<(Var, Value)> = self
            .entries()
            .into_iter()
            .map(|(var, value)| (var.clone(), value.clone()))
            .collect();
        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        pairs
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}
