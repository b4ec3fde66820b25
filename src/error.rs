//! Error types shared across the engine.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by plan construction and execution.
///
/// The variants fall into three classes with different audiences: `Query`
/// and `Unsupported` describe a problem with the query itself and are meant
/// for the caller; `Internal` marks a programming-contract violation that
/// should never occur under correct API usage; `Execution` carries failures
/// raised while pulling results from the operator tree.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The query is malformed or references something unresolvable.
    #[error("invalid query: {0}")]
    Query(String),
    /// The query uses a construct this engine does not implement.
    #[error("unsupported query construct: {0}")]
    Unsupported(&'static str),
    /// Contract violation inside the engine. Treated as a defect, never
    /// retried or converted into a user-facing condition.
    #[error("internal engine error: {0}")]
    Internal(&'static str),
    /// Failure raised while iterating an already-built plan.
    #[error("execution failed: {0}")]
    Execution(String),
}
