//! External processor bridge.
//!
//! Exposes user processing functions of separate-process components over
//! local sockets so code running out of process can call back into them.
//!
//! ## Contents
//! - [`Value`], [`NdArray`], [`ArrayData`] the self-describing payload
//! - [`codec`] length-prefixed framing and `postcard` payload encoding
//! - [`Processor`] a user processing function
//! - [`Endpoint`], [`BridgePool`] serving side (unix only)
//! - [`BridgeClient`] calling side (unix only)
//!
//! Payload serialization is the `bridge` cargo feature (on by default).

pub mod codec;
mod processor;
mod value;

#[cfg(unix)]
mod client;
#[cfg(unix)]
mod endpoint;

#[cfg(unix)]
pub use client::BridgeClient;
#[cfg(unix)]
pub use endpoint::{BridgePool, Endpoint, EndpointSpec, endpoint_address};
pub use processor::Processor;
pub use value::{ArrayData, NdArray, Value};
