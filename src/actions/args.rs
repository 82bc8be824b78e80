use std::collections::BTreeMap;

use crate::bridge::Value;

/// Positional and keyword arguments of an action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    /// Positional arguments in order.
    pub positional: Vec<Value>,
    /// Keyword arguments by name.
    pub keyword: BTreeMap<String, Value>,
}

impl Args {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// True when there are no arguments of either kind.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}
