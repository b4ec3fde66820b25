//! Canonical scalar value representation flowing through bindings and
//! operators.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Identifier of a node in the underlying graph store.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed value tagged with explicit type information so the serialized form
/// remains unambiguous across consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Value {
    /// Null literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Signed 64-bit integer literal.
    Int(i64),
    /// 64-bit floating point literal.
    Float(f64),
    /// UTF-8 string literal.
    String(String),
    /// Arbitrary binary payload.
    Bytes(Vec<u8>),
    /// Nanoseconds since Unix epoch in UTC.
    DateTime(i64),
    /// Reference to a graph node.
    Node(NodeId),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<NodeId> for Value {
    fn from(value: NodeId) -> Self {
        Value::Node(value)
    }
}

/// Rank used to order values of different types relative to each other.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Float(_) => 2,
        Value::String(_) => 3,
        Value::Bytes(_) => 4,
        Value::DateTime(_) => 5,
        Value::Node(_) => 6,
    }
}

/// Total order over values used by the sort operator.
///
/// Values of the same type compare naturally; integers and floats compare
/// numerically against each other. NaN compares equal to everything in its
/// rank so sorting stays stable. Values of different types order by a fixed
/// type rank.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
        (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
        (Value::Node(a), Value::Node(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Hashable canonical form of a [`Value`], used as a deduplication key.
///
/// Floats are keyed by their bit pattern so every value has a stable
/// identity; `0.0` and `-0.0` are therefore distinct keys.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueKey {
    /// Null literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal keyed by bit pattern.
    Float(u64),
    /// String literal.
    String(String),
    /// Binary payload.
    Bytes(Vec<u8>),
    /// DateTime literal.
    DateTime(i64),
    /// Node reference.
    Node(NodeId),
}

impl From<&Value> for ValueKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ValueKey::Null,
            Value::Bool(v) => ValueKey::Bool(*v),
            Value::Int(v) => ValueKey::Int(*v),
            Value::Float(v) => ValueKey::Float(v.to_bits()),
            Value::String(v) => ValueKey::String(v.clone()),
            Value::Bytes(v) => ValueKey::Bytes(v.clone()),
            Value::DateTime(v) => ValueKey::DateTime(*v),
            Value::Node(v) => ValueKey::Node(*v),
        }
    }
}
