//! Shared key/value configuration read by the plan builder and operators.

use rustc_hash::FxHashMap;

/// Interned configuration key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Symbol(pub &'static str);

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// When true, a Distinct operator is forced even if the query did not
/// request one.
pub const AUTO_DISTINCT: Symbol = Symbol("engine:auto-distinct");

/// Value stored against a [`Symbol`].
#[derive(Clone, Debug, PartialEq)]
pub enum Setting {
    /// Boolean setting.
    Bool(bool),
    /// Integer setting.
    Int(i64),
    /// String setting.
    Str(String),
}

impl From<bool> for Setting {
    fn from(value: bool) -> Self {
        Setting::Bool(value)
    }
}

impl From<i64> for Setting {
    fn from(value: i64) -> Self {
        Setting::Int(value)
    }
}

impl From<&str> for Setting {
    fn from(value: &str) -> Self {
        Setting::Str(value.to_owned())
    }
}

impl From<String> for Setting {
    fn from(value: String) -> Self {
        Setting::Str(value)
    }
}

/// Configuration map threaded read-only through plan building and execution.
#[derive(Clone, Debug, Default)]
pub struct Context {
    settings: FxHashMap<Symbol, Setting>,
}

impl Context {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a setting, replacing any previous value.
    pub fn set(&mut self, symbol: Symbol, value: impl Into<Setting>) {
        self.settings.insert(symbol, value.into());
    }

    /// Fluent variant of [`Context::set`].
    pub fn with(mut self, symbol: Symbol, value: impl Into<Setting>) -> Self {
        self.set(symbol, value);
        self
    }

    /// Looks up a setting.
    pub fn get(&self, symbol: Symbol) -> Option<&Setting> {
        self.settings.get(&symbol)
    }

    /// Whether the symbol is set to boolean true.
    pub fn is_true(&self, symbol: Symbol) -> bool {
        matches!(self.settings.get(&symbol), Some(Setting::Bool(true)))
    }
}
