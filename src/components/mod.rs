//! Managed components: the trait, lifecycle machine and operation table.
//!
//! ## Contents
//! - [`Component`], [`ComponentRef`], [`ComponentContext`] the worker contract
//! - [`Topology`], [`RunType`] where and how a component runs
//! - [`LifecycleState`], [`Transition`], [`LifecycleHandler`] the state machine
//! - [`Operation`], [`Operations`], [`HandlerTable`] named operations for actions

mod component;
mod lifecycle;
mod operations;

pub use component::{AsAny, Component, ComponentContext, ComponentRef, RunType, Topology};
pub use lifecycle::{LifecycleHandler, LifecycleState, Transition};
pub use operations::{
    HandlerTable, Invocation, Operation, OperationFuture, Operations, Param, Signature,
};
