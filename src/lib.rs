//! Pattern query plan construction and execution engine.
//!
//! Given a parsed query — a pattern to match plus solution modifiers —
//! this crate builds a tree of lazy evaluation operators around the base
//! subtree an external pattern compiler produces, and drives that tree to
//! yield a pull-based stream of variable-to-value bindings. Modifier
//! operators wrap in a fixed, semantically required order:
//! pattern → OrderBy → Project → Distinct → LimitOffset.
//!
//! Storage access, query parsing, and pattern compilation stay outside the
//! crate behind the [`dataset`] and [`pattern`] seams.

#![forbid(unsafe_code)]

/// Immutable parent-chained solution bindings.
pub mod binding;

/// Shared key/value configuration.
pub mod config;

/// Per-execution context bundle.
pub mod context;

/// Dataset and graph collaborator handles.
pub mod dataset;

/// Query engine orchestration.
pub mod engine;

/// Error types.
pub mod error;

/// Pull-based, closeable result iteration.
pub mod iter;

/// Pattern structure and the external compiler contract.
pub mod pattern;

/// Physical plan tree, modifier operators, and the plan builder.
pub mod plan;

/// Query structure and solution modifiers.
pub mod query;

/// Engine factory dispatch.
pub mod registry;

/// Scalar values bound to variables.
pub mod value;

pub use binding::{Binding, Var};
pub use config::{Context, AUTO_DISTINCT};
pub use engine::QueryEngine;
pub use error::{EngineError, Result};
pub use iter::ResultIter;
pub use query::{Query, ResultShape};
pub use value::Value;
