//! User processing functions served over the bridge.

use std::fmt;
use std::sync::Arc;

use super::value::Value;
use crate::error::ComponentError;

type ProcessorFn = dyn Fn(Value) -> Result<Value, ComponentError> + Send + Sync;

/// A user processing function exposed over the bridge.
///
/// Runs on the blocking thread pool; it may do heavy synchronous work.
#[derive(Clone)]
pub struct Processor {
    name: Arc<str>,
    f: Arc<ProcessorFn>,
}

impl Processor {
    /// Wraps a processing function.
    pub fn new<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ComponentError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    /// Function name (part of the endpoint address).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the function; failures become [`Value::Error`].
    pub fn call(&self, input: Value) -> Value {
        (self.f)(input).unwrap_or_else(|e| Value::Error(e.to_string()))
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
