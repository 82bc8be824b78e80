//! # Component operations and the handler table.
//!
//! Actions address component operations by name. Instead of runtime
//! reflection, every component type declares a closed set of
//! [`Operation`]s, and the registry records them in a [`HandlerTable`]
//! keyed by `(component kind, operation name)` when the component is added.
//!
//! Typed handlers are written with [`Operations`], which downcasts the
//! shared component back to its concrete type before calling the closure:
//!
//! ```text
//! Operations::<Planner>::new()
//!     .handler("replan", |planner: Arc<Planner>, inv| ...)
//!     .fallback("reset", |planner, _| ...)       // fallback-eligible
//!     .build()  ──► Vec<Operation>  ──► HandlerTable[(kind, name)]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::component::{AsAny, Component, ComponentRef};
use crate::actions::Args;
use crate::bridge::Value;
use crate::error::ComponentError;

/// Boxed future returned by operation handlers.
pub type OperationFuture = BoxFuture<'static, Result<(), ComponentError>>;

type HandlerFn = dyn Fn(ComponentRef, Invocation) -> OperationFuture + Send + Sync;

/// Declared parameter of an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// True if the parameter has no default.
    pub required: bool,
}

impl Param {
    /// Parameter without a default.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// Parameter with a default.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Parameter list of an operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// No parameters.
    pub fn none() -> Self {
        Self::default()
    }

    /// Explicit parameter list.
    pub fn new(params: impl IntoIterator<Item = Param>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    /// Declared parameters.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Names of parameters without defaults.
    pub fn required(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.clone())
            .collect()
    }

    /// True if the operation can be called with no arguments.
    pub fn accepts_no_args(&self) -> bool {
        self.params.iter().all(|p| !p.required)
    }
}

/// Arguments of one operation call, with the target identity injected.
#[derive(Clone, Debug)]
pub struct Invocation {
    /// Name of the component the call targets.
    pub component: Arc<str>,
    /// Call arguments.
    pub args: Args,
}

impl Invocation {
    /// Creates an invocation for `component`.
    pub fn new(component: impl Into<Arc<str>>, args: Args) -> Self {
        Self {
            component: component.into(),
            args,
        }
    }

    /// Keyword argument `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.keyword.get(name)
    }

    /// Positional argument at `index`.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.args.positional.get(index)
    }

    /// Keyword argument `name`, or [`ComponentError::MissingArgument`].
    pub fn require(&self, name: &str) -> Result<&Value, ComponentError> {
        self.get(name).ok_or_else(|| ComponentError::MissingArgument {
            name: name.to_string(),
        })
    }
}

/// A named operation a component type exposes to actions.
#[derive(Clone)]
pub struct Operation {
    name: Arc<str>,
    signature: Signature,
    fallback: bool,
    handler: Arc<HandlerFn>,
}

impl Operation {
    /// Creates an operation over the type-erased component handle.
    pub fn new<F, Fut>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(ComponentRef, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            signature: Signature::none(),
            fallback: false,
            handler: Arc::new(move |comp, inv| f(comp, inv).boxed()),
        }
    }

    /// Declares the parameter list.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Marks the operation as eligible for fallback use.
    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    /// Operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// True if the operation may be bound as a fallback.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Calls the handler on `component`.
    pub fn invoke(&self, component: ComponentRef, invocation: Invocation) -> OperationFuture {
        (self.handler)(component, invocation)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Builder of typed operations for component type `C`.
pub struct Operations<C> {
    ops: Vec<Operation>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Component> Default for Operations<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> Operations<C> {
    /// Empty set.
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Adds a handler without parameters.
    pub fn handler<F, Fut>(self, name: &str, f: F) -> Self
    where
        F: Fn(Arc<C>, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        self.push(name, Signature::none(), false, f)
    }

    /// Adds a handler with a declared parameter list.
    pub fn handler_with<F, Fut>(self, name: &str, signature: Signature, f: F) -> Self
    where
        F: Fn(Arc<C>, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        self.push(name, signature, false, f)
    }

    /// Adds a fallback-eligible handler without parameters.
    pub fn fallback<F, Fut>(self, name: &str, f: F) -> Self
    where
        F: Fn(Arc<C>, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        self.push(name, Signature::none(), true, f)
    }

    /// Adds a fallback-eligible handler with a declared parameter list.
    pub fn fallback_with<F, Fut>(self, name: &str, signature: Signature, f: F) -> Self
    where
        F: Fn(Arc<C>, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        self.push(name, signature, true, f)
    }

    /// Finishes the set.
    pub fn build(self) -> Vec<Operation> {
        self.ops
    }

    fn push<F, Fut>(mut self, name: &str, signature: Signature, fallback: bool, f: F) -> Self
    where
        F: Fn(Arc<C>, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        let handler = move |comp: ComponentRef, inv: Invocation| -> OperationFuture {
            match <dyn Component as AsAny>::into_any(comp).downcast::<C>() {
                Ok(typed) => f(typed, inv).boxed(),
                Err(_) => futures::future::ready(Err(ComponentError::TypeMismatch {
                    expected: std::any::type_name::<C>(),
                }))
                .boxed(),
            }
        };
        self.ops.push(Operation {
            name: Arc::from(name),
            signature,
            fallback,
            handler: Arc::new(handler),
        });
        self
    }
}

/// Closed `(component kind, operation) → handler` table.
///
/// Populated while components are registered and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct HandlerTable {
    kinds: HashMap<&'static str, BTreeMap<String, Operation>>,
}

impl HandlerTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the operations of `component`'s kind. The first component of a kind wins.
    pub fn register(&mut self, component: &dyn Component) {
        let kind = component.kind();
        if self.kinds.contains_key(kind) {
            return;
        }
        let ops = component
            .operations()
            .into_iter()
            .map(|op| (op.name().to_string(), op))
            .collect();
        self.kinds.insert(kind, ops);
    }

    /// Handler for `operation` on `kind`.
    pub fn get(&self, kind: &str, operation: &str) -> Option<&Operation> {
        self.kinds.get(kind)?.get(operation)
    }

    /// Sorted names of the fallback-eligible operations of `kind`.
    pub fn fallbacks(&self, kind: &str) -> Vec<String> {
        self.kinds
            .get(kind)
            .map(|ops| {
                ops.values()
                    .filter(|op| op.is_fallback())
                    .map(|op| op.name().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// True if no kind was registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::components::ComponentContext;

    #[derive(Default)]
    struct Counter {
        hits: AtomicU32,
    }

    #[async_trait]
    impl Component for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn operations(&self) -> Vec<Operation> {
            Operations::<Self>::new()
                .handler_with(
                    "add",
                    Signature::new([Param::required("n")]),
                    |me, inv| async move {
                        let n = match inv.require("n")? {
                            Value::UInt(n) => *n as u32,
                            _ => return Err(ComponentError::failed("n must be unsigned")),
                        };
                        me.hits.fetch_add(n, Ordering::SeqCst);
                        Ok(())
                    },
                )
                .fallback("bump", |me, _| async move {
                    me.hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        }

        async fn run(&self, _ctx: ComponentContext) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    struct Other;

    #[async_trait]
    impl Component for Other {
        fn name(&self) -> &str {
            "other"
        }

        async fn run(&self, _ctx: ComponentContext) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn typed_handlers_reach_the_concrete_component() {
        let counter = Arc::new(Counter::default());
        let mut table = HandlerTable::new();
        table.register(counter.as_ref());

        let op = table.get(counter.kind(), "add").expect("registered");
        let args = Args::new().kwarg("n", Value::UInt(3));
        op.invoke(counter.clone(), Invocation::new("counter", args))
            .await
            .unwrap();

        let bump = table.get(counter.kind(), "bump").expect("registered");
        bump.invoke(counter.clone(), Invocation::new("counter", Args::new()))
            .await
            .unwrap();

        assert_eq!(counter.hits.load(Ordering::SeqCst), 4);
        assert_eq!(table.fallbacks(counter.kind()), vec!["bump".to_string()]);
    }

    #[tokio::test]
    async fn missing_argument_and_wrong_type_fail() {
        let counter = Arc::new(Counter::default());
        let ops = counter.operations();
        let add = ops.iter().find(|op| op.name() == "add").unwrap();

        let err = add
            .invoke(counter.clone(), Invocation::new("counter", Args::new()))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "component_missing_argument");

        let err = add
            .invoke(Arc::new(Other), Invocation::new("other", Args::new()))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "component_type_mismatch");
    }

    #[test]
    fn signature_reports_required_params() {
        let sig = Signature::new([Param::required("goal"), Param::optional("speed")]);
        assert!(!sig.accepts_no_args());
        assert_eq!(sig.required(), vec!["goal".to_string()]);
        assert!(Signature::new([Param::optional("speed")]).accepts_no_args());
    }

    #[test]
    fn unknown_kind_has_no_handlers() {
        let table = HandlerTable::new();
        assert!(table.get("nope", "reset").is_none());
        assert!(table.fallbacks("nope").is_empty());
        assert!(table.is_empty());
    }
}
